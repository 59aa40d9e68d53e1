//! The native message tree.
//!
//! A catalog parses into a tree whose leaves are [`Message`]s and whose
//! internal nodes are mappings or sequences. Each node is explicitly
//! tagged, and a mapping knows from construction whether it is a
//! component-interpolation group (a sibling set containing a `full` key)
//! rather than re-deriving that at every call site.
//!
//! Sequences are leaf-containers: their elements are messages or further
//! mappings, never nested sequences.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::core::message::Message;

/// Key that marks a sibling group as a component-interpolation tree root.
pub const FULL_KEY: &str = "full";

/// Join a dotted key path with one more segment.
pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// One node of the native message tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageNode {
    Leaf(Message),
    Mapping(Mapping),
    Sequence(Vec<MessageNode>),
}

/// An ordered mapping node. Entry order follows the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, MessageNode)>,
    interpolation: bool,
}

impl Mapping {
    pub fn new(entries: Vec<(String, MessageNode)>) -> Self {
        let interpolation = entries.iter().any(|(key, _)| key == FULL_KEY);
        Self {
            entries,
            interpolation,
        }
    }

    /// True when this sibling group forms a component-interpolation tree.
    pub fn is_interpolation(&self) -> bool {
        self.interpolation
    }

    pub fn get(&self, key: &str) -> Option<&MessageNode> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MessageNode)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), n))
    }

    pub fn into_entries(self) -> Vec<(String, MessageNode)> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MessageNode {
    /// Build a typed tree from parsed JSON.
    ///
    /// Strings become messages (native-format parse), objects become
    /// mappings, arrays become sequences. Anything else has no place in a
    /// message catalog and fails with its path.
    pub fn from_value(value: &Value, path: &str) -> Result<Self> {
        match value {
            Value::String(raw) => {
                let message = Message::from_native(raw)
                    .with_context(|| format!("Invalid message at \"{}\"", display_path(path)))?;
                Ok(MessageNode::Leaf(message))
            }
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, child) in map {
                    let child_path = join_path(path, key);
                    entries.push((key.clone(), MessageNode::from_value(child, &child_path)?));
                }
                Ok(MessageNode::Mapping(Mapping::new(entries)))
            }
            Value::Array(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let element_path = join_path(path, &index.to_string());
                    if item.is_array() {
                        bail!(
                            "Nested array at \"{}\": arrays may hold messages or mappings, not further arrays.",
                            display_path(&element_path)
                        );
                    }
                    elements.push(MessageNode::from_value(item, &element_path)?);
                }
                Ok(MessageNode::Sequence(elements))
            }
            other => bail!(
                "Unsupported value {} at \"{}\": catalog values are strings, objects or arrays.",
                other,
                display_path(path)
            ),
        }
    }

    /// Resolve a dotted path against this node. Sequence segments are
    /// decimal indices.
    pub fn resolve(&self, path: &str) -> Option<&MessageNode> {
        let mut current = self;
        for segment in path.split('.') {
            current = match current {
                MessageNode::Mapping(mapping) => mapping.get(segment)?,
                MessageNode::Sequence(elements) => {
                    let index: usize = segment.parse().ok()?;
                    elements.get(index)?
                }
                MessageNode::Leaf(_) => return None,
            };
        }
        Some(current)
    }

    pub fn as_leaf(&self) -> Option<&Message> {
        match self {
            MessageNode::Leaf(message) => Some(message),
            _ => None,
        }
    }
}

/// Render a path for diagnostics; the root is shown as "<root>".
pub fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> MessageNode {
        MessageNode::from_value(&value, "").unwrap()
    }

    #[test]
    fn builds_nested_mappings() {
        let root = tree(json!({"common": {"save": "Save", "cancel": "Cancel"}}));
        let save = root.resolve("common.save").unwrap();
        assert_eq!(save.as_leaf().unwrap().first_variant(), "Save");
    }

    #[test]
    fn builds_sequences_with_index_paths() {
        let root = tree(json!({"steps": ["one", "two", {"title": "three"}]}));
        assert_eq!(
            root.resolve("steps.1").unwrap().as_leaf().unwrap().first_variant(),
            "two"
        );
        assert_eq!(
            root.resolve("steps.2.title")
                .unwrap()
                .as_leaf()
                .unwrap()
                .first_variant(),
            "three"
        );
    }

    #[test]
    fn flags_interpolation_groups_at_construction() {
        let root = tree(json!({
            "prompt": {"full": "Click {here}.", "here": "here"},
            "plain": {"title": "Title"}
        }));
        match root.resolve("prompt").unwrap() {
            MessageNode::Mapping(mapping) => assert!(mapping.is_interpolation()),
            _ => panic!("expected mapping"),
        }
        match root.resolve("plain").unwrap() {
            MessageNode::Mapping(mapping) => assert!(!mapping.is_interpolation()),
            _ => panic!("expected mapping"),
        }
    }

    #[test]
    fn nested_arrays_fail() {
        let err = MessageNode::from_value(&json!({"a": [["x"]]}), "").unwrap_err();
        assert!(err.to_string().contains("Nested array"));
    }

    #[test]
    fn non_string_scalars_fail_with_path() {
        let err = MessageNode::from_value(&json!({"a": {"b": 3}}), "").unwrap_err();
        assert!(err.to_string().contains("a.b"));
    }

    #[test]
    fn invalid_message_error_names_path() {
        let err = MessageNode::from_value(&json!({"a": "one | two | three"}), "").unwrap_err();
        assert!(err.to_string().contains("Invalid message at \"a\""));
    }

    #[test]
    fn resolve_misses_return_none() {
        let root = tree(json!({"a": {"b": "x"}}));
        assert!(root.resolve("a.c").is_none());
        assert!(root.resolve("a.b.c").is_none());
    }
}
