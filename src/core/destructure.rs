//! Destructuring: per-locale exchange payload to translated-value tree.
//!
//! The platform returns the same flat shape it was given. Any object that
//! carries a `string` field is a message leaf and is parsed through the
//! exchange-format constructor for the target locale; everything else
//! stays a plain nested mapping (including the index-keyed mappings that
//! stand in for arrays).

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::core::locales::Locale;
use crate::core::message::Message;
use crate::core::tree::{display_path, join_path};

/// A node of the translated tree: native-shaped values without structure
/// guarantees, to be merged against the source tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslatedNode {
    Leaf(Message),
    Mapping(Vec<(String, TranslatedNode)>),
}

impl TranslatedNode {
    pub fn empty_mapping() -> Self {
        TranslatedNode::Mapping(Vec::new())
    }

    pub fn get(&self, path: &str) -> Option<&TranslatedNode> {
        let mut current = self;
        for segment in path.split('.') {
            let TranslatedNode::Mapping(entries) = current else {
                return None;
            };
            current = entries
                .iter()
                .find(|(key, _)| key == segment)
                .map(|(_, node)| node)?;
        }
        Some(current)
    }

    /// Insert a node at a dotted path, creating intermediate mappings and
    /// replacing whatever was there.
    pub fn insert(&mut self, path: &str, node: TranslatedNode) {
        let mut current = self;
        let segments: Vec<&str> = path.split('.').collect();
        for (position, segment) in segments.iter().enumerate() {
            if !matches!(current, TranslatedNode::Mapping(_)) {
                *current = TranslatedNode::empty_mapping();
            }
            let TranslatedNode::Mapping(entries) = current else {
                unreachable!("just normalized to a mapping");
            };
            let index = match entries.iter().position(|(key, _)| key == segment) {
                Some(index) => index,
                None => {
                    entries.push((segment.to_string(), TranslatedNode::empty_mapping()));
                    entries.len() - 1
                }
            };
            if position == segments.len() - 1 {
                entries[index].1 = node;
                return;
            }
            current = &mut entries[index].1;
        }
    }

    /// Remove the subtree at a dotted path, if present.
    pub fn remove(&mut self, path: &str) {
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments.split_last().expect("path is non-empty");

        let mut current = self;
        for segment in parents {
            let TranslatedNode::Mapping(entries) = current else {
                return;
            };
            let Some(index) = entries.iter().position(|(key, _)| key == segment) else {
                return;
            };
            current = &mut entries[index].1;
        }
        if let TranslatedNode::Mapping(entries) = current {
            entries.retain(|(key, _)| key != last);
        }
    }
}

/// Parse a per-locale exchange payload into a translated tree.
pub fn destructure(payload: &Value, locale: &Locale) -> Result<TranslatedNode> {
    destructure_node(payload, locale, "")
}

fn destructure_node(value: &Value, locale: &Locale, path: &str) -> Result<TranslatedNode> {
    let Value::Object(object) = value else {
        bail!(
            "Unexpected {} at \"{}\" in the {} exchange payload: every node is an object.",
            value,
            display_path(path),
            locale.code
        );
    };

    if let Some(string) = object.get("string") {
        let Value::String(raw) = string else {
            bail!(
                "Non-string \"string\" field at \"{}\" in the {} exchange payload.",
                display_path(path),
                locale.code
            );
        };
        let message = Message::from_exchange(raw, locale).with_context(|| {
            format!(
                "Invalid {} translation at \"{}\"",
                locale.code,
                display_path(path)
            )
        })?;
        return Ok(TranslatedNode::Leaf(message));
    }

    let mut entries = Vec::with_capacity(object.len());
    for (key, child) in object {
        let child_path = join_path(path, key);
        entries.push((key.clone(), destructure_node(child, locale, &child_path)?));
    }
    Ok(TranslatedNode::Mapping(entries))
}
