//! Substitution-token extraction for message variants.
//!
//! Message text interpolates runtime values through `{name}` tokens.
//! Every plural variant of a message must use the same token set, and the
//! exchange round-trip must never gain or lose a token, so extraction is
//! the primitive most validation passes are built on.

use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

static VARIABLE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("valid regex"));

/// Extracts the sorted, deduplicated set of `{name}` tokens from one
/// message variant.
///
/// Two variants use "the same variables" iff their sorted token lists are
/// equal; occurrence order and repetition are irrelevant.
///
/// Fails when the variant contains brace characters that are not part of a
/// well-formed token: every `{` and `}` must belong to exactly one match,
/// so the total brace count has to be twice the number of token
/// occurrences.
pub fn extract_variables(variant: &str) -> Result<Vec<String>> {
    let mut occurrences = 0;
    let mut names: Vec<String> = Vec::new();
    for capture in VARIABLE_TOKEN.captures_iter(variant) {
        occurrences += 1;
        let name = capture[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }

    let brace_count = variant.chars().filter(|c| *c == '{' || *c == '}').count();
    if brace_count != occurrences * 2 {
        bail!(
            "Unbalanced or stray brace in \"{}\": braces may only appear as part of a {{name}} variable token.",
            variant
        );
    }

    names.sort();
    Ok(names)
}

/// Renders a variable name back into its token form, e.g. `here` -> `{here}`.
pub fn token(name: &str) -> String {
    format!("{{{}}}", name)
}

/// True when a variable token is glued to adjacent text, e.g.
/// `"{count}items"`.
///
/// Languages written with inter-word spacing expect a separator around a
/// substituted value; a missing one is a stylistic warning, not an error.
pub fn has_glued_token(variant: &str) -> bool {
    VARIABLE_TOKEN.find_iter(variant).any(|found| {
        let before = variant[..found.start()].chars().next_back();
        let after = variant[found.end()..].chars().next();
        before.is_some_and(|c| c.is_alphanumeric()) || after.is_some_and(|c| c.is_alphanumeric())
    })
}
