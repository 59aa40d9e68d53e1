//! Embedded component block extraction and rewriting.
//!
//! Component files carry their translated messages in an autogenerated
//! block between `<i18n>` and `</i18n>` delimiters: a JSON mapping from
//! locale code to that component's message subtree. The surrounding file
//! content is opaque; only the delimited block is read or replaced.

use std::collections::BTreeMap;
use std::ops::Range;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

/// Opening delimiter of the embedded block.
pub const BLOCK_OPEN: &str = "<i18n>";
/// Closing delimiter of the embedded block.
pub const BLOCK_CLOSE: &str = "</i18n>";

/// The embedded block found in a component file.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentBlock {
    /// Byte range of the whole block, delimiters included.
    pub range: Range<usize>,
    /// Mapping from locale code to that locale's message subtree.
    pub locales: Map<String, Value>,
}

/// Extract the embedded block from a component file, if present.
pub fn extract_block(content: &str, origin: &str) -> Result<Option<ComponentBlock>> {
    let Some(open) = content.find(BLOCK_OPEN) else {
        return Ok(None);
    };
    let body_start = open + BLOCK_OPEN.len();

    let Some(close_offset) = content[body_start..].find(BLOCK_CLOSE) else {
        bail!(
            "Malformed block in {}: missing closing {} delimiter.",
            origin,
            BLOCK_CLOSE
        );
    };
    let body_end = body_start + close_offset;
    let end = body_end + BLOCK_CLOSE.len();

    // The closing delimiter owns the rest of its line.
    let line_rest = content[end..].split('\n').next().unwrap_or("");
    if !line_rest.trim().is_empty() {
        bail!(
            "Malformed block in {}: unexpected trailing content {:?} after {}.",
            origin,
            line_rest.trim(),
            BLOCK_CLOSE
        );
    }

    if content[end..].contains(BLOCK_OPEN) {
        bail!("Malformed block in {}: more than one {} block.", origin, BLOCK_OPEN);
    }

    let body = content[body_start..body_end].trim();
    let json: Value = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse the {} block in {}", BLOCK_OPEN, origin))?;
    let Value::Object(locales) = json else {
        bail!(
            "The {} block in {} must be an object mapping locale codes to messages.",
            BLOCK_OPEN,
            origin
        );
    };

    Ok(Some(ComponentBlock {
        range: open..end,
        locales,
    }))
}

/// Render the block body for writing: locales in alphabetical order,
/// pretty-printed, with literal `<` escaped so the body can never contain
/// a premature closing delimiter.
pub fn render_block_body(locales: &BTreeMap<String, Value>) -> Result<String> {
    let mut object = Map::new();
    for (code, tree) in locales {
        object.insert(code.clone(), tree.clone());
    }
    let rendered = serde_json::to_string_pretty(&Value::Object(object))
        .context("Failed to serialize the component block")?;
    Ok(rendered.replace('<', "\\u003c"))
}

/// Splice a freshly rendered block into the component file content,
/// replacing the existing block or appending a new one.
pub fn replace_block(content: &str, existing: Option<&Range<usize>>, body: &str) -> String {
    let block = format!("{}\n{}\n{}", BLOCK_OPEN, body, BLOCK_CLOSE);
    match existing {
        Some(range) => {
            let mut updated = String::with_capacity(content.len() + block.len());
            updated.push_str(&content[..range.start]);
            updated.push_str(&block);
            updated.push_str(&content[range.end..]);
            updated
        }
        None => {
            let mut updated = content.to_string();
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(&block);
            updated.push('\n');
            updated
        }
    }
}
