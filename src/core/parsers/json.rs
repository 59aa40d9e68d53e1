//! Tolerant catalog parsing with comment capture.
//!
//! Catalog files are JSON plus `//` comment lines. JSON parsers discard
//! trivia, so comments are collected in an explicit side-channel map
//! before the remainder is handed to serde_json (with `preserve_order`,
//! entry order follows the file):
//!
//! - A run of comment lines immediately above a key becomes that key's
//!   inline developer comment.
//! - A block of `// key: comment` lines at the top of the file, before
//!   the opening brace, addresses leaf keys by name.
//!
//! Key locations are recovered after parsing by scanning the stripped
//! source with a forward-moving cursor; keys are visited in document
//! order, so each one is found past the previous match.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::core::tree::{MessageNode, join_path};

/// Side-channel developer comments for one catalog file.
#[derive(Debug, Default, Clone)]
pub struct FileComments {
    /// Comment above a key, addressed by full dotted path.
    pub inline: HashMap<String, String>,
    /// Top-of-file comment, addressed by leaf key name.
    pub named: HashMap<String, String>,
}

/// A parsed catalog: the typed message tree plus its comments.
#[derive(Debug)]
pub struct ParsedCatalog {
    pub root: MessageNode,
    pub comments: FileComments,
}

pub fn parse_catalog_file(path: &Path) -> Result<ParsedCatalog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    parse_catalog_str(&content, &path.to_string_lossy())
}

pub fn parse_catalog_str(content: &str, origin: &str) -> Result<ParsedCatalog> {
    let lines: Vec<&str> = content.lines().collect();

    // The top comment block ends at the first non-comment, non-blank line.
    let body_start = lines
        .iter()
        .position(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("//")
        })
        .unwrap_or(lines.len());

    let mut named = HashMap::new();
    for line in &lines[..body_start] {
        if let Some((key, comment)) = parse_named_comment(line) {
            named.insert(key, comment);
        }
    }

    // Strip comment lines but keep the line structure, so byte offsets in
    // the stripped text still map to the original line numbers.
    let mut comments_by_line: HashMap<usize, String> = HashMap::new();
    let stripped: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let trimmed = line.trim();
            if let Some(comment) = trimmed.strip_prefix("//") {
                if index >= body_start {
                    comments_by_line.insert(index + 1, comment.trim().to_string());
                }
                String::new()
            } else {
                line.to_string()
            }
        })
        .collect();
    let stripped = stripped.join("\n");

    let json: Value = serde_json::from_str(&stripped)
        .with_context(|| format!("Failed to parse catalog file: {}", origin))?;
    let root = MessageNode::from_value(&json, "")
        .with_context(|| format!("Invalid catalog file: {}", origin))?;

    let mut inline = HashMap::new();
    let mut locator = KeyLocator::new(&stripped);
    collect_inline_comments(&json, "", &mut locator, &comments_by_line, &mut inline);

    Ok(ParsedCatalog {
        root,
        comments: FileComments { inline, named },
    })
}

/// Parse one `// key: comment` line from the top-of-file block.
fn parse_named_comment(line: &str) -> Option<(String, String)> {
    let rest = line.trim().strip_prefix("//")?.trim();
    let (key, comment) = rest.split_once(':')?;
    let key = key.trim();
    let comment = comment.trim();
    if key.is_empty()
        || comment.is_empty()
        || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }
    Some((key.to_string(), comment.to_string()))
}

/// Locates key occurrences in the stripped source.
///
/// The cursor only moves forward: document order of the parsed tree
/// matches textual order, so duplicate leaf names in different
/// namespaces resolve to the right occurrence.
struct KeyLocator<'c> {
    content: &'c str,
    line_starts: Vec<usize>,
    cursor: usize,
}

impl<'c> KeyLocator<'c> {
    fn new(content: &'c str) -> Self {
        let mut line_starts = vec![0];
        for (offset, c) in content.char_indices() {
            if c == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            content,
            line_starts,
            cursor: 0,
        }
    }

    /// Find the next occurrence of `"key"` used as a JSON key (followed by
    /// a colon) and return its 1-based line number.
    fn locate(&mut self, key: &str) -> Option<usize> {
        let pattern = format!("\"{}\"", key);
        let mut position = self.cursor;
        while let Some(relative) = self.content[position..].find(&pattern) {
            let absolute = position + relative;
            let after = absolute + pattern.len();
            if self.content[after..].trim_start().starts_with(':') {
                self.cursor = after;
                return Some(self.offset_to_line(absolute));
            }
            position = absolute + 1;
        }
        None
    }

    fn offset_to_line(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}

fn collect_inline_comments(
    value: &Value,
    path: &str,
    locator: &mut KeyLocator,
    comments_by_line: &HashMap<usize, String>,
    inline: &mut HashMap<String, String>,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = join_path(path, key);
                if let Some(line) = locator.locate(key)
                    && let Some(comment) = gather_comment_above(line, comments_by_line)
                {
                    inline.insert(child_path.clone(), comment);
                }
                collect_inline_comments(child, &child_path, locator, comments_by_line, inline);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let child_path = join_path(path, &index.to_string());
                collect_inline_comments(item, &child_path, locator, comments_by_line, inline);
            }
        }
        _ => {}
    }
}

/// Collect the contiguous run of comment lines directly above `line`,
/// joined top-down with a space.
fn gather_comment_above(line: usize, comments_by_line: &HashMap<usize, String>) -> Option<String> {
    let mut collected = Vec::new();
    let mut current = line.checked_sub(1)?;
    while let Some(comment) = comments_by_line.get(&current) {
        collected.push(comment.clone());
        match current.checked_sub(1) {
            Some(previous) => current = previous,
            None => break,
        }
    }
    if collected.is_empty() {
        return None;
    }
    collected.reverse();
    Some(collected.join(" "))
}
