//! Shared loading and writing helpers for the commands.
//!
//! Everything filesystem-shaped lives here: config + registry setup, the
//! source catalog with its grafted component subtree, and artifact
//! writing. The engine itself never touches a file.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde_json::Value;
use walkdir::WalkDir;

use crate::cli::args::CommonArgs;
use crate::config::{Config, load_config};
use crate::core::parsers::component::{extract_block, render_block_body, replace_block};
use crate::core::parsers::json::{FileComments, parse_catalog_file};
use crate::core::tree::{Mapping, MessageNode, join_path};
use crate::core::{Locale, LocaleRegistry};

/// Key under which component messages are grafted into the source tree.
/// Reserved: the catalog file itself may not use it.
pub const COMPONENTS_KEY: &str = "components";

pub struct Workspace {
    pub config: Config,
    pub registry: LocaleRegistry,
}

impl Workspace {
    pub fn source_locale(&self) -> Result<&Locale> {
        self.registry.get(&self.config.source_locale)
    }

    pub fn exchange_payload_path(&self, locale: &str) -> PathBuf {
        Path::new(&self.config.exchange_root).join(format!("{}.json", locale))
    }

    pub fn locale_output_path(&self, locale: &str) -> PathBuf {
        Path::new(&self.config.output_root).join(format!("{}.json", locale))
    }
}

/// Load the config from the current directory upwards, apply CLI
/// overrides, and build the locale registry.
pub fn load_workspace(common: &CommonArgs) -> Result<Workspace> {
    let current_dir = std::env::current_dir().context("Failed to resolve current directory")?;
    let mut config = load_config(&current_dir)?.config;

    if let Some(source_locale) = &common.source_locale {
        config.source_locale = source_locale.clone();
    }
    if let Some(messages_root) = &common.messages_root {
        config.messages_root = messages_root.to_string_lossy().to_string();
    }
    if let Some(exchange_root) = &common.exchange_root {
        config.exchange_root = exchange_root.to_string_lossy().to_string();
    }
    if let Some(output_root) = &common.output_root {
        config.output_root = output_root.to_string_lossy().to_string();
    }
    config.validate()?;

    let registry = LocaleRegistry::build(&config.locales, &config.locale_overrides)?;
    Ok(Workspace { config, registry })
}

/// One scanned component file.
pub struct ComponentSource {
    /// Component name (the file stem); also its key under `components.`.
    pub name: String,
    pub path: PathBuf,
    pub content: String,
    /// Byte range of the existing embedded block, if any.
    pub block_range: Option<Range<usize>>,
    /// The authored source-locale messages from the block, verbatim.
    pub source_messages: Option<Value>,
}

/// The fully assembled source tree: catalog file plus the component
/// subtree collected from embedded blocks.
pub struct SourceCatalog {
    pub root: MessageNode,
    pub comments: FileComments,
    pub components: Vec<ComponentSource>,
}

pub fn load_source_catalog(workspace: &Workspace) -> Result<SourceCatalog> {
    let config = &workspace.config;
    let catalog_path = Path::new(&config.messages_root)
        .join(format!("{}.json", config.source_locale));
    if !catalog_path.exists() {
        bail!(
            "Source catalog '{}' does not exist.\n\
             Hint: check the 'messagesRoot' setting in {}.",
            catalog_path.display(),
            crate::config::CONFIG_FILE_NAME
        );
    }

    let parsed = parse_catalog_file(&catalog_path)?;
    let MessageNode::Mapping(mapping) = parsed.root else {
        bail!("The root of '{}' must be an object.", catalog_path.display());
    };
    if mapping.get(COMPONENTS_KEY).is_some() {
        bail!(
            "The key \"{}\" in '{}' is reserved for component messages.",
            COMPONENTS_KEY,
            catalog_path.display()
        );
    }

    let components = scan_components(config)?;

    let mut component_entries = Vec::new();
    for component in &components {
        if let Some(source_messages) = &component.source_messages {
            let node_path = join_path(COMPONENTS_KEY, &component.name);
            let node = MessageNode::from_value(source_messages, &node_path).with_context(|| {
                format!("Invalid messages in '{}'", component.path.display())
            })?;
            component_entries.push((component.name.clone(), node));
        }
    }

    let mut entries = mapping.into_entries();
    if !component_entries.is_empty() {
        entries.push((
            COMPONENTS_KEY.to_string(),
            MessageNode::Mapping(Mapping::new(component_entries)),
        ));
    }

    Ok(SourceCatalog {
        root: MessageNode::Mapping(Mapping::new(entries)),
        comments: parsed.comments,
        components,
    })
}

fn scan_components(config: &Config) -> Result<Vec<ComponentSource>> {
    let root = Path::new(&config.components_root);
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let ignore_patterns: Vec<Pattern> = config
        .ignores
        .iter()
        .map(|pattern| Pattern::new(pattern).map_err(anyhow::Error::from))
        .collect::<Result<_>>()?;

    let mut components = Vec::new();
    let mut seen_names = HashSet::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(config.component_extension.as_str()) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path).to_string_lossy();
        if ignore_patterns.iter().any(|pattern| pattern.matches(&relative)) {
            continue;
        }

        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !seen_names.insert(name.to_string()) {
            bail!(
                "Duplicate component name \"{}\": component file stems must be unique ({}).",
                name,
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read component file: {}", path.display()))?;
        let block = extract_block(&content, &path.display().to_string())?;
        let (block_range, source_messages) = match block {
            Some(block) => (
                Some(block.range),
                block.locales.get(&config.source_locale).cloned(),
            ),
            None => (None, None),
        };

        components.push(ComponentSource {
            name: name.to_string(),
            path: path.to_path_buf(),
            content,
            block_range,
            source_messages,
        });
    }
    Ok(components)
}

/// Write a JSON artifact with pretty 2-space formatting and a trailing
/// newline, creating parent directories as needed.
pub fn write_json_file(path: &Path, tree: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(tree).context("Failed to serialize JSON")?;
    fs::write(path, format!("{}\n", content))
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Render the updated content of a component file for the given
/// locale-to-messages mapping.
pub fn render_component_file(
    component: &ComponentSource,
    locales: &BTreeMap<String, Value>,
) -> Result<String> {
    let body = render_block_body(locales)?;
    Ok(replace_block(
        &component.content,
        component.block_range.as_ref(),
        &body,
    ))
}
