//! The `import` command: per-locale payloads in, locale artifacts out.
//!
//! For every non-source locale the platform payload is destructured,
//! merged against the source tree and run through the cleanup and
//! validation passes; the source locale gets the round-trip self-check
//! instead. Every artifact is computed before anything is written, so a
//! failing locale aborts the run with the filesystem untouched.

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde_json::Value;

use super::command_result::{CommandResult, CommandSummary, ImportSummary, LocaleCoverage};
use super::helper::{
    COMPONENTS_KEY, SourceCatalog, Workspace, load_source_catalog, load_workspace,
    render_component_file, write_json_file,
};
use crate::cli::args::ImportCommand;
use crate::core::destructure::destructure;
use crate::core::merge::{MergeTree, verify_source_round_trip};
use crate::issues::Issue;

/// Everything computed for one target locale.
pub struct LocaleComputation {
    pub coverage: LocaleCoverage,
    pub issues: Vec<Issue>,
    /// Native-shaped translated tree, component subtree still attached.
    pub tree: Value,
}

/// Run the source self-check and the per-locale merge pipeline for every
/// non-source locale.
pub(crate) fn compute_all(
    workspace: &Workspace,
    catalog: &SourceCatalog,
) -> Result<Vec<LocaleComputation>> {
    let source = workspace.source_locale()?;
    verify_source_round_trip(&catalog.root, &catalog.comments, source)?;

    let targets: Vec<&str> = workspace
        .config
        .locales
        .iter()
        .filter(|code| **code != workspace.config.source_locale)
        .map(String::as_str)
        .collect();

    // Each merge tree borrows the same immutable source tree, so the
    // per-locale computations are independent; only the writes later on
    // stay sequential.
    targets
        .par_iter()
        .map(|code| compute_locale(workspace, catalog, code))
        .collect()
}

fn compute_locale(
    workspace: &Workspace,
    catalog: &SourceCatalog,
    code: &str,
) -> Result<LocaleComputation> {
    let locale = workspace.registry.get(code)?;

    let payload_path = workspace.exchange_payload_path(code);
    if !payload_path.exists() {
        bail!(
            "No exchange payload for locale \"{}\" at '{}'.\n\
             Hint: fetch the locale from the translation platform first.",
            code,
            payload_path.display()
        );
    }
    let raw = fs::read_to_string(&payload_path)
        .with_context(|| format!("Failed to read payload file: {}", payload_path.display()))?;
    let payload: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse payload file: {}", payload_path.display()))?;

    let translated = destructure(&payload, locale)?;
    let mut merge = MergeTree::new(&catalog.root, locale, translated)?;
    merge.delete_partial_translations()?;
    merge.copy_linked_messages()?;
    let issues = merge.validate()?;
    let (untranslated, total) = merge.untranslated_counts();
    let tree = merge.emit()?;

    Ok(LocaleComputation {
        coverage: LocaleCoverage {
            locale: code.to_string(),
            translated: total - untranslated,
            total,
        },
        issues,
        tree,
    })
}

pub fn import(cmd: ImportCommand) -> Result<CommandResult> {
    let workspace = load_workspace(&cmd.common)?;
    let catalog = load_source_catalog(&workspace)?;
    let computed = compute_all(&workspace, &catalog)?;

    // Plan every write before touching the filesystem.
    let mut locale_files = Vec::new();
    let mut block_translations: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    for computation in &computed {
        let mut tree = computation.tree.clone();
        let components_value = match &mut tree {
            Value::Object(map) => map.remove(COMPONENTS_KEY),
            _ => None,
        };
        locale_files.push((
            workspace.locale_output_path(&computation.coverage.locale),
            tree,
        ));
        if let Some(Value::Object(map)) = components_value {
            for (name, value) in map {
                block_translations
                    .entry(name)
                    .or_default()
                    .insert(computation.coverage.locale.clone(), value);
            }
        }
    }

    let mut component_files = Vec::new();
    for component in &catalog.components {
        let mut locales: BTreeMap<String, Value> = BTreeMap::new();
        if let Some(source_messages) = &component.source_messages {
            locales.insert(workspace.config.source_locale.clone(), source_messages.clone());
        }
        if let Some(translations) = block_translations.get(&component.name) {
            locales.extend(translations.clone());
        }
        if locales.is_empty() {
            continue;
        }
        component_files.push((
            component.path.clone(),
            render_component_file(component, &locales)?,
        ));
    }

    if !cmd.dry_run {
        for (path, tree) in &locale_files {
            write_json_file(path, tree)?;
        }
        for (path, content) in &component_files {
            fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
    }

    let issues: Vec<Issue> = computed
        .iter()
        .flat_map(|computation| computation.issues.clone())
        .collect();
    let coverage = computed
        .iter()
        .map(|computation| computation.coverage.clone())
        .collect();

    Ok(CommandResult {
        summary: CommandSummary::Import(ImportSummary {
            coverage,
            locale_file_count: locale_files.len(),
            component_file_count: component_files.len(),
            is_dry_run: cmd.dry_run,
        }),
        issues,
    })
}
