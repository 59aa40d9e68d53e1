use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".locsyncrc.json";

/// Per-locale overrides for registry metadata.
///
/// Pinning the plural category set keeps CI runs independent of the ICU
/// data shipped with the binary; the separator flag covers scripts the
/// built-in list does not know about.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural_categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn_on_missing_variable_separator: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Every locale the project supports, source locale included.
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
    #[serde(default = "default_source_locale")]
    pub source_locale: String,
    /// Directory holding the source-locale catalog file.
    #[serde(default = "default_messages_root", alias = "messagesDir")]
    pub messages_root: String,
    /// Directory scanned recursively for component files.
    #[serde(default = "default_components_root")]
    pub components_root: String,
    /// File extension of component files.
    #[serde(default = "default_component_extension")]
    pub component_extension: String,
    /// Directory exchanged with the translation platform: the exported
    /// payload is written here and per-locale payloads are read from here.
    #[serde(default = "default_exchange_root")]
    pub exchange_root: String,
    /// Directory receiving the per-locale output artifacts.
    #[serde(default = "default_output_root")]
    pub output_root: String,
    /// Glob patterns excluded from the component scan.
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default)]
    pub locale_overrides: BTreeMap<String, LocaleOverride>,
}

fn default_locales() -> Vec<String> {
    vec![default_source_locale()]
}

fn default_source_locale() -> String {
    "en".to_string()
}

fn default_messages_root() -> String {
    "./messages".to_string()
}

fn default_components_root() -> String {
    "./src/components".to_string()
}

fn default_component_extension() -> String {
    "vue".to_string()
}

fn default_exchange_root() -> String {
    "./translations".to_string()
}

fn default_output_root() -> String {
    "./dist/locales".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locales: default_locales(),
            source_locale: default_source_locale(),
            messages_root: default_messages_root(),
            components_root: default_components_root(),
            component_extension: default_component_extension(),
            exchange_root: default_exchange_root(),
            output_root: default_output_root(),
            ignores: Vec::new(),
            locale_overrides: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for invalid glob patterns in `ignores`, an empty
    /// locale list, or a source locale missing from `locales`.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        if self.locales.is_empty() {
            bail!("The 'locales' list must not be empty.");
        }
        if !self.locales.contains(&self.source_locale) {
            bail!(
                "The source locale \"{}\" must appear in the 'locales' list.",
                self.source_locale
            );
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    let Some(path) = find_config_file(start_dir) else {
        let config = Config::default();
        config.validate()?;
        return Ok(ConfigLoadResult {
            config,
            from_file: false,
        });
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config.validate()?;
    Ok(ConfigLoadResult {
        config,
        from_file: true,
    })
}
