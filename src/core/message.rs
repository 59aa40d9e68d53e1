//! The pluralized-string value type.
//!
//! A [`Message`] holds every grammatical variant of one translatable
//! string: one variant per plural category the owning locale
//! distinguishes, or a single variant for non-pluralized text. It converts
//! to and from both representations the tool deals in — the native catalog
//! format (` | `-separated forms) and the platform's exchange format (an
//! ICU-style plural wrapper) — and self-validates its invariants on every
//! construction:
//!
//! - every variant uses the identical set of `{name}` variable tokens;
//! - either all variants are empty or none are (uniform emptiness means
//!   "untranslated");
//! - braces only appear as part of well-formed tokens.
//!
//! Messages are immutable. Containers replace them, they never mutate one
//! in place.

use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

use crate::core::locales::Locale;
use crate::core::variables::extract_variables;
use crate::utils::{collapse_whitespace, has_untidy_whitespace};

/// Separator between the singular and plural form in native catalog values.
pub const FORM_SEPARATOR: &str = " | ";

static PLURAL_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\{\s*count\s*,\s*plural\s*,(.*)\}$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    variants: Vec<String>,
}

impl Message {
    /// Construct from raw variants, enforcing the variable-set and uniform
    /// emptiness invariants.
    pub fn new(variants: Vec<String>) -> Result<Self> {
        if variants.is_empty() {
            bail!("A message needs at least one variant.");
        }

        let empty_count = variants.iter().filter(|v| v.is_empty()).count();
        if empty_count != 0 && empty_count != variants.len() {
            bail!(
                "Mixed empty and non-empty plural variants in {:?}: emptiness marks a message untranslated and must be all-or-nothing.",
                variants
            );
        }

        let canonical = extract_variables(&variants[0])?;
        for variant in &variants[1..] {
            let vars = extract_variables(variant)?;
            if vars != canonical {
                bail!(
                    "Variable mismatch between plural variants: \"{}\" uses {{{}}} but \"{}\" uses {{{}}}.",
                    variants[0],
                    canonical.join(", "),
                    variant,
                    vars.join(", ")
                );
            }
        }

        Ok(Self { variants })
    }

    /// The canonical "untranslated" message: a single empty variant.
    pub fn empty() -> Self {
        Self {
            variants: vec![String::new()],
        }
    }

    /// Parse a native catalog value, e.g. `"{count} car | {count} cars"`.
    ///
    /// At most two forms are allowed; a `|` inside a form would make the
    /// encoding ambiguous and is rejected, as is untidy whitespace.
    pub fn from_native(raw: &str) -> Result<Self> {
        let variants: Vec<String> = raw.split(FORM_SEPARATOR).map(String::from).collect();
        if variants.len() > 2 {
            bail!(
                "More than two plural forms in \"{}\": the native format holds at most a singular and a plural form.",
                raw
            );
        }
        for variant in &variants {
            if variant.contains('|') {
                bail!(
                    "Stray '|' in \"{}\": the character is reserved as the plural form separator.",
                    raw
                );
            }
            if has_untidy_whitespace(variant) {
                bail!(
                    "Leading, trailing or doubled whitespace in \"{}\".",
                    raw
                );
            }
        }
        Self::new(variants)
    }

    /// Parse an exchange-format value for the given locale.
    ///
    /// A value wrapped in `{count, plural, cat {...} ...}` yields one
    /// variant per category and the categories found must exactly match
    /// the locale's set; anything else is taken as a single variant.
    /// Whitespace is collapsed per variant before validation.
    pub fn from_exchange(raw: &str, locale: &Locale) -> Result<Self> {
        let variants = match parse_plural_wrapper(raw)? {
            Some(blocks) => {
                let mut found: Vec<String> = blocks.iter().map(|(c, _)| c.clone()).collect();
                found.sort();
                let mut expected = locale.plural_categories.clone();
                expected.sort();
                if found != expected {
                    bail!(
                        "Plural categories [{}] in \"{}\" do not match the categories [{}] expected for locale \"{}\". This usually means the platform returned an untranslated (source-language) string.",
                        found.join(", "),
                        raw,
                        expected.join(", "),
                        locale.code
                    );
                }
                locale
                    .plural_categories
                    .iter()
                    .map(|category| {
                        let (_, text) = blocks
                            .iter()
                            .find(|(c, _)| c == category)
                            .expect("category checked against expected set");
                        collapse_whitespace(text)
                    })
                    .collect()
            }
            None => vec![collapse_whitespace(raw)],
        };
        Self::new(variants)
    }

    /// True iff the message is untranslated (uniform emptiness makes the
    /// first variant representative).
    pub fn is_empty(&self) -> bool {
        self.variants[0].is_empty()
    }

    /// True iff the message carries more than one plural form.
    pub fn is_plural(&self) -> bool {
        self.variants.len() > 1
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn first_variant(&self) -> &str {
        &self.variants[0]
    }

    /// The final-category variant ("other" for pluralized locales); the
    /// form translators should see in generated context.
    pub fn last_variant(&self) -> &str {
        self.variants.last().expect("at least one variant")
    }

    /// The message's variable set (the first variant is canonical).
    pub fn variables(&self) -> Result<Vec<String>> {
        extract_variables(&self.variants[0])
    }

    /// Encode to the native catalog format by joining forms with ` | `.
    pub fn to_native(&self) -> Result<String> {
        for variant in &self.variants {
            if variant.contains('|') {
                bail!(
                    "Cannot encode \"{}\" to the native format: '|' inside a form is ambiguous with the form separator.",
                    variant
                );
            }
        }
        Ok(self.variants.join(FORM_SEPARATOR))
    }

    /// Encode to the exchange format: the bare string for one variant, the
    /// two-category ICU wrapper for two.
    pub fn to_exchange(&self) -> Result<String> {
        for variant in &self.variants {
            if variant.contains('\'') {
                bail!(
                    "Cannot encode \"{}\" for the exchange format: the single quote is reserved for ICU escaping.",
                    variant
                );
            }
            if variant.contains('#') {
                bail!(
                    "Cannot encode \"{}\" for the exchange format: '#' is reserved for ICU count substitution.",
                    variant
                );
            }
        }
        match self.variants.as_slice() {
            [single] => Ok(single.clone()),
            [one, other] => Ok(format!(
                "{{count, plural, one {{{}}} other {{{}}}}}",
                one, other
            )),
            _ => bail!(
                "Cannot encode a {}-variant message for the exchange format; only one or two forms are supported.",
                self.variants.len()
            ),
        }
    }
}

/// Parse the ICU-style plural wrapper, returning `(category, text)` blocks
/// in source order, or `None` when the value is not wrapped.
///
/// Block boundaries are found by tracking nested brace depth, since variant
/// text itself contains `{name}` tokens.
fn parse_plural_wrapper(raw: &str) -> Result<Option<Vec<(String, String)>>> {
    let trimmed = raw.trim();
    let Some(captures) = PLURAL_WRAPPER.captures(trimmed) else {
        return Ok(None);
    };
    let mut rest = captures[1].trim_start();

    let mut blocks = Vec::new();
    while !rest.is_empty() {
        let name_end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let category = &rest[..name_end];
        if category.is_empty() {
            bail!(
                "Malformed plural wrapper \"{}\": expected a category name, found \"{}\".",
                raw,
                rest
            );
        }
        rest = rest[name_end..].trim_start();

        if !rest.starts_with('{') {
            bail!(
                "Malformed plural wrapper \"{}\": category \"{}\" is not followed by a braced block.",
                raw,
                category
            );
        }

        let mut depth = 0usize;
        let mut block_end = None;
        for (offset, c) in rest.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        block_end = Some(offset);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(block_end) = block_end else {
            bail!(
                "Malformed plural wrapper \"{}\": unterminated block for category \"{}\".",
                raw,
                category
            );
        };

        blocks.push((category.to_string(), rest[1..block_end].to_string()));
        rest = rest[block_end + 1..].trim_start();
    }

    if blocks.is_empty() {
        bail!("Malformed plural wrapper \"{}\": no category blocks.", raw);
    }
    Ok(Some(blocks))
}
