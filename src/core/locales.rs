//! Locale registry: static per-locale metadata.
//!
//! The registry is built once at startup and read-only afterwards. For each
//! configured locale it records the set of CLDR plural categories the
//! locale distinguishes and whether the stylistic variable-spacing warning
//! applies. Categories come from explicit config overrides where given and
//! from ICU plural rules otherwise.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use icu_plurals::{PluralCategory, PluralRuleType, PluralRules};

use crate::config::LocaleOverride;

/// CLDR plural category names in canonical order.
pub const CATEGORY_NAMES: &[&str] = &["zero", "one", "two", "few", "many", "other"];

/// Scripts written without inter-word spacing; variable tokens there do not
/// need a separator character and the spacing warning stays off by default.
const NO_SEPARATOR_LANGUAGES: &[&str] = &["ja", "ko", "th", "zh"];

/// Static metadata for one supported locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    /// Locale code (e.g., "en", "zh-CN").
    pub code: String,
    /// Plural categories the locale distinguishes, in canonical CLDR order.
    pub plural_categories: Vec<String>,
    /// Whether to warn when a variable token touches adjacent text without
    /// a separator character.
    pub warn_on_missing_variable_separator: bool,
}

impl Locale {
    /// True when the locale distinguishes more than one plural category.
    pub fn is_pluralized(&self) -> bool {
        self.plural_categories.len() > 1
    }
}

/// Immutable lookup table of all locales the current run may touch.
#[derive(Debug)]
pub struct LocaleRegistry {
    locales: BTreeMap<String, Locale>,
}

impl LocaleRegistry {
    /// Build the registry for the configured locale codes.
    ///
    /// An override may pin the category set and the separator-warning flag;
    /// anything not overridden is derived from ICU plural rules and the
    /// built-in no-separator language list.
    pub fn build(
        codes: &[String],
        overrides: &BTreeMap<String, LocaleOverride>,
    ) -> Result<Self> {
        let mut locales = BTreeMap::new();
        for code in codes {
            let locale_override = overrides.get(code);

            let plural_categories = match locale_override.and_then(|o| o.plural_categories.clone())
            {
                Some(categories) => validated_categories(code, categories)?,
                None => cldr_categories(code)?,
            };

            let warn_on_missing_variable_separator = locale_override
                .and_then(|o| o.warn_on_missing_variable_separator)
                .unwrap_or_else(|| {
                    let language = code.split('-').next().unwrap_or(code);
                    !NO_SEPARATOR_LANGUAGES.contains(&language)
                });

            locales.insert(
                code.clone(),
                Locale {
                    code: code.clone(),
                    plural_categories,
                    warn_on_missing_variable_separator,
                },
            );
        }
        Ok(Self { locales })
    }

    /// Look up a locale by code.
    ///
    /// A miss is a configuration error: every locale a payload or catalog
    /// references must be declared up front.
    pub fn get(&self, code: &str) -> Result<&Locale> {
        self.locales.get(code).with_context(|| {
            format!(
                "Unknown locale \"{}\". Add it to the 'locales' list in the configuration file.",
                code
            )
        })
    }

    /// Iterate over all registered locales in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Locale> {
        self.locales.values()
    }
}

fn category_name(category: PluralCategory) -> &'static str {
    match category {
        PluralCategory::Zero => "zero",
        PluralCategory::One => "one",
        PluralCategory::Two => "two",
        PluralCategory::Few => "few",
        PluralCategory::Many => "many",
        PluralCategory::Other => "other",
    }
}

/// Derive a locale's plural category set from ICU rules.
///
/// ICU exposes a classifier, not a set, so each category is probed with
/// representative counts known to select it in the languages that have
/// it. "other" is appended unconditionally: every cardinal rule set ends
/// in it, and integer probes cannot reach it for languages whose integers
/// exhaust the named categories (Russian maps every integer to
/// one/few/many).
fn cldr_categories(code: &str) -> Result<Vec<String>> {
    let locale: icu_locale::Locale = code
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid locale code \"{}\": {}", code, e))?;
    let rules = PluralRules::try_new(locale.into(), PluralRuleType::Cardinal.into())
        .map_err(|e| anyhow::anyhow!("No plural rules available for locale \"{}\": {}", code, e))?;

    let probes: &[(PluralCategory, &[usize])] = &[
        (PluralCategory::Zero, &[0]),
        (PluralCategory::One, &[1, 21, 31, 41]),
        (PluralCategory::Two, &[2, 22, 32]),
        (PluralCategory::Few, &[3, 4, 23, 24]),
        (PluralCategory::Many, &[5, 11, 101]),
    ];

    let mut categories = Vec::new();
    for (category, counts) in probes {
        if counts.iter().any(|&n| rules.category_for(n) == *category) {
            categories.push(category_name(*category).to_string());
        }
    }
    categories.push(category_name(PluralCategory::Other).to_string());
    Ok(categories)
}

/// Normalize an override category list into canonical CLDR order, rejecting
/// unknown names and duplicates.
fn validated_categories(code: &str, categories: Vec<String>) -> Result<Vec<String>> {
    for name in &categories {
        if !CATEGORY_NAMES.contains(&name.as_str()) {
            bail!(
                "Unknown plural category \"{}\" in the override for locale \"{}\" (expected one of: {}).",
                name,
                code,
                CATEGORY_NAMES.join(", ")
            );
        }
    }
    let ordered: Vec<String> = CATEGORY_NAMES
        .iter()
        .filter(|name| categories.iter().any(|c| c == *name))
        .map(|name| name.to_string())
        .collect();
    if ordered.len() != categories.len() {
        bail!(
            "Duplicate plural category in the override for locale \"{}\".",
            code
        );
    }
    if ordered.is_empty() {
        bail!(
            "Empty plural category override for locale \"{}\"; a locale needs at least one category.",
            code
        );
    }
    Ok(ordered)
}
