//! The `check` command: the full import pipeline with writes disabled.
//!
//! Runs the source-locale round-trip self-check and every per-locale
//! merge and validation pass, then reports coverage and warnings without
//! touching the filesystem.

use anyhow::Result;

use super::command_result::{CheckSummary, CommandResult, CommandSummary};
use super::helper::{load_source_catalog, load_workspace};
use super::import::compute_all;
use crate::cli::args::CheckCommand;
use crate::issues::Issue;

pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let workspace = load_workspace(&cmd.common)?;
    let catalog = load_source_catalog(&workspace)?;
    let computed = compute_all(&workspace, &catalog)?;

    let issues: Vec<Issue> = computed
        .iter()
        .flat_map(|computation| computation.issues.clone())
        .collect();
    let coverage = computed
        .iter()
        .map(|computation| computation.coverage.clone())
        .collect();

    Ok(CommandResult {
        summary: CommandSummary::Check(CheckSummary { coverage }),
        issues,
    })
}
