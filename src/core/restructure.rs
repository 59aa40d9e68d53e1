//! Restructuring: native message tree to flat exchange tree.
//!
//! The exchange format mirrors the native tree but cannot represent
//! arrays (they become index-keyed mappings) or links (they are validated
//! and then omitted; the merge step re-fills them from the target's
//! translation). Every message leaf becomes a `{string,
//! developer_comment?}` object; the comment is composed from the inline
//! comment above the key, the named top-of-file comment for the key, and
//! the generated component-interpolation context.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::core::interpolation::InterpolationTree;
use crate::core::link::{link_path, resolve_link};
use crate::core::message::Message;
use crate::core::parsers::json::FileComments;
use crate::core::tree::{Mapping, MessageNode, display_path, join_path};

/// One leaf of the exchange tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeLeaf {
    pub string: String,
    pub developer_comment: Option<String>,
}

/// A node of the exchange tree: a leaf or an ordered mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeNode {
    Leaf(ExchangeLeaf),
    Mapping(Vec<(String, ExchangeNode)>),
}

impl ExchangeNode {
    /// Serialize to the JSON document sent to the platform.
    pub fn to_value(&self) -> Value {
        match self {
            ExchangeNode::Leaf(leaf) => {
                let mut object = Map::new();
                object.insert("string".to_string(), Value::String(leaf.string.clone()));
                if let Some(comment) = &leaf.developer_comment {
                    object.insert(
                        "developer_comment".to_string(),
                        Value::String(comment.clone()),
                    );
                }
                Value::Object(object)
            }
            ExchangeNode::Mapping(entries) => {
                let mut object = Map::new();
                for (key, child) in entries {
                    object.insert(key.clone(), child.to_value());
                }
                Value::Object(object)
            }
        }
    }
}

/// Convert a native message tree into the exchange payload.
pub fn restructure(root: &MessageNode, comments: &FileComments) -> Result<Value> {
    let MessageNode::Mapping(mapping) = root else {
        bail!("The catalog root must be a mapping.");
    };
    let restructurer = Restructurer { root, comments };
    let node = restructurer
        .mapping(mapping, "", false)?
        .unwrap_or(ExchangeNode::Mapping(Vec::new()));
    Ok(node.to_value())
}

struct Restructurer<'a> {
    root: &'a MessageNode,
    comments: &'a FileComments,
}

impl Restructurer<'_> {
    /// Restructure a mapping node. Returns `None` when every child was
    /// omitted (all links), which drops the key from the parent.
    fn mapping(
        &self,
        mapping: &Mapping,
        path: &str,
        in_array: bool,
    ) -> Result<Option<ExchangeNode>> {
        let interpolation_comments = if mapping.is_interpolation() {
            // Links would vanish from the group and leave the partial
            // cleanup pass free to strip visible text; reject them before
            // parent discovery can misreport them as orphans.
            for (key, node) in mapping.iter() {
                if let Some(message) = node.as_leaf()
                    && link_path(message)?.is_some()
                {
                    bail!(
                        "Link at \"{}\" sits inside a component-interpolation group; links are not allowed there.",
                        join_path(path, key)
                    );
                }
            }
            Some(InterpolationTree::build(mapping, path)?.comments())
        } else {
            None
        };

        let mut entries = Vec::new();
        for (key, node) in mapping.iter() {
            let child_path = join_path(path, key);
            match node {
                MessageNode::Leaf(message) => {
                    if let Some(target) = link_path(message)? {
                        if in_array {
                            bail!(
                                "Link at \"{}\" sits inside an array; links are not allowed there.",
                                child_path
                            );
                        }
                        resolve_link(self.root, &target, &child_path)?;
                        continue;
                    }
                    let generated = interpolation_comments
                        .as_ref()
                        .and_then(|comments| comments.get(key));
                    entries.push((
                        key.to_string(),
                        self.leaf(message, &child_path, key, generated)?,
                    ));
                }
                MessageNode::Mapping(child) => {
                    if let Some(node) = self.mapping(child, &child_path, in_array)? {
                        entries.push((key.to_string(), node));
                    }
                }
                MessageNode::Sequence(elements) => {
                    entries.push((key.to_string(), self.sequence(elements, &child_path)?));
                }
            }
        }

        if entries.is_empty() {
            return Ok(None);
        }
        Ok(Some(ExchangeNode::Mapping(entries)))
    }

    /// Restructure an array into a mapping keyed by stringified index; the
    /// exchange format has no native array type.
    fn sequence(&self, elements: &[MessageNode], path: &str) -> Result<ExchangeNode> {
        let mut entries = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            let element_path = join_path(path, &index.to_string());
            match element {
                MessageNode::Leaf(message) => {
                    if link_path(message)?.is_some() {
                        bail!(
                            "Link at \"{}\" is an array element; links are not allowed there.",
                            element_path
                        );
                    }
                    entries.push((
                        index.to_string(),
                        self.leaf(message, &element_path, &index.to_string(), None)?,
                    ));
                }
                MessageNode::Mapping(child) => {
                    if let Some(node) = self.mapping(child, &element_path, true)? {
                        entries.push((index.to_string(), node));
                    }
                }
                MessageNode::Sequence(_) => bail!(
                    "Nested array at \"{}\": arrays may hold messages or mappings, not further arrays.",
                    element_path
                ),
            }
        }
        Ok(ExchangeNode::Mapping(entries))
    }

    fn leaf(
        &self,
        message: &Message,
        path: &str,
        key: &str,
        generated: Option<&String>,
    ) -> Result<ExchangeNode> {
        let string = message
            .to_exchange()
            .with_context(|| format!("Cannot export the message at \"{}\"", display_path(path)))?;

        let authored = self
            .comments
            .inline
            .get(path)
            .or_else(|| self.comments.named.get(key));
        let developer_comment = match (authored, generated) {
            (Some(authored), Some(generated)) => Some(format!("{}\n{}", authored, generated)),
            (Some(authored), None) => Some(authored.clone()),
            (None, Some(generated)) => Some(generated.clone()),
            (None, None) => None,
        };

        Ok(ExchangeNode::Leaf(ExchangeLeaf {
            string,
            developer_comment,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(value: Value) -> Result<Value> {
        let root = MessageNode::from_value(&value, "")?;
        restructure(&root, &FileComments::default())
    }

    #[test]
    fn message_leaves_become_string_objects() {
        let payload = run(json!({"common": {"save": "Save"}})).unwrap();
        assert_eq!(payload, json!({"common": {"save": {"string": "Save"}}}));
    }

    #[test]
    fn plural_message_gets_icu_wrapper() {
        let payload = run(json!({"cars": "{count} car | {count} cars"})).unwrap();
        assert_eq!(
            payload,
            json!({"cars": {"string": "{count, plural, one {{count} car} other {{count} cars}}"}})
        );
    }

    #[test]
    fn arrays_become_index_keyed_mappings() {
        let payload = run(json!({"steps": ["one", "two"]})).unwrap();
        assert_eq!(
            payload,
            json!({"steps": {"0": {"string": "one"}, "1": {"string": "two"}}})
        );
    }

    #[test]
    fn links_are_validated_and_omitted() {
        let payload = run(json!({"a": {"b": "Save"}, "x": {"y": "@:a.b"}})).unwrap();
        assert_eq!(payload, json!({"a": {"b": {"string": "Save"}}}));
    }

    #[test]
    fn mapping_of_only_links_is_dropped_entirely() {
        let payload = run(json!({"a": "Save", "aliases": {"x": "@:a", "y": "@:a"}})).unwrap();
        assert_eq!(payload, json!({"a": {"string": "Save"}}));
    }

    #[test]
    fn dangling_link_fails() {
        let err = run(json!({"x": "@:missing.key"})).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn chained_link_fails() {
        let err = run(json!({"a": "@:b", "b": "@:c", "c": "End"})).unwrap_err();
        assert!(err.to_string().contains("chained"));
    }

    #[test]
    fn link_in_array_fails() {
        let err = run(json!({"a": "Save", "steps": ["@:a"]})).unwrap_err();
        assert!(err.to_string().contains("array element"));

        let err = run(json!({"a": "Save", "steps": [{"x": "@:a"}]})).unwrap_err();
        assert!(err.to_string().contains("inside an array"));
    }

    #[test]
    fn link_in_interpolation_group_fails() {
        let err = run(json!({
            "a": "Save",
            "prompt": {"full": "Click {here}.", "here": "@:a"}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("component-interpolation group"));
    }

    #[test]
    fn interpolation_group_generates_comments() {
        let payload = run(json!({
            "prompt": {"full": "Click {here}.", "here": "here"}
        }))
        .unwrap();
        let full_comment = payload["prompt"]["full"]["developer_comment"].as_str().unwrap();
        assert!(full_comment.contains("separately translated"));
        let here_comment = payload["prompt"]["here"]["developer_comment"].as_str().unwrap();
        assert!(here_comment.contains("\"Click here.\""));
    }

    #[test]
    fn inline_comment_precedes_named_and_interpolation_is_appended() {
        let root = MessageNode::from_value(
            &json!({"prompt": {"full": "Click {here}.", "here": "here"}}),
            "",
        )
        .unwrap();
        let mut comments = FileComments::default();
        comments
            .inline
            .insert("prompt.full".to_string(), "Shown on the banner".to_string());
        comments
            .named
            .insert("full".to_string(), "Top-of-file comment".to_string());

        let payload = restructure(&root, &comments).unwrap();
        let full_comment = payload["prompt"]["full"]["developer_comment"].as_str().unwrap();
        let mut lines = full_comment.lines();
        assert_eq!(lines.next(), Some("Shown on the banner"));
        assert!(full_comment.contains("separately translated"));
        assert!(!full_comment.contains("Top-of-file comment"));
    }

    #[test]
    fn named_comment_used_when_no_inline() {
        let root = MessageNode::from_value(&json!({"title": "Hello"}), "").unwrap();
        let mut comments = FileComments::default();
        comments
            .named
            .insert("title".to_string(), "Landing page headline".to_string());

        let payload = restructure(&root, &comments).unwrap();
        assert_eq!(
            payload["title"]["developer_comment"],
            json!("Landing page headline")
        );
    }
}
