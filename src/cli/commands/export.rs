//! The `export` command: source catalog in, exchange payload out.

use anyhow::Result;
use serde_json::Value;

use super::command_result::{CommandResult, CommandSummary, ExportSummary};
use super::helper::{load_source_catalog, load_workspace, write_json_file};
use crate::cli::args::ExportCommand;
use crate::core::restructure::restructure;

pub fn export(cmd: ExportCommand) -> Result<CommandResult> {
    let workspace = load_workspace(&cmd.common)?;
    workspace.source_locale()?;
    let catalog = load_source_catalog(&workspace)?;

    let payload = restructure(&catalog.root, &catalog.comments)?;
    let message_count = count_message_leaves(&payload);

    let payload_path = workspace.exchange_payload_path(&workspace.config.source_locale);
    write_json_file(&payload_path, &payload)?;

    Ok(CommandResult {
        summary: CommandSummary::Export(ExportSummary {
            message_count,
            payload_path,
        }),
        issues: Vec::new(),
    })
}

fn count_message_leaves(value: &Value) -> usize {
    match value {
        Value::Object(map) => {
            if map.contains_key("string") {
                1
            } else {
                map.values().map(count_message_leaves).sum()
            }
        }
        _ => 0,
    }
}
