//! The translation merge tree.
//!
//! One merge tree is built per locale-write operation from the immutable
//! source tree and the (possibly partial) translated tree destructured
//! from the platform payload. It exposes read/write/delete/walk
//! operations addressed by dotted key paths, runs the per-locale cleanup
//! and validation passes, and serializes the final native-shaped
//! artifact. Handles are paths, never aliases into the owned tree, and
//! the source side is never mutated.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::core::destructure::{TranslatedNode, destructure};
use crate::core::link::{LINK_MARKER, link_path, resolve_link};
use crate::core::locales::Locale;
use crate::core::message::Message;
use crate::core::parsers::json::FileComments;
use crate::core::restructure::restructure;
use crate::core::tree::{MessageNode, display_path, join_path};
use crate::issues::Issue;

pub struct MergeTree<'a> {
    locale: &'a Locale,
    source: &'a MessageNode,
    translated: TranslatedNode,
}

impl<'a> MergeTree<'a> {
    /// Build a merge tree over an immutable source tree and the in-progress
    /// translated payload for one locale.
    pub fn new(
        source: &'a MessageNode,
        locale: &'a Locale,
        translated: TranslatedNode,
    ) -> Result<Self> {
        if !matches!(source, MessageNode::Mapping(_)) {
            bail!("The source tree root must be a mapping.");
        }
        if !matches!(translated, TranslatedNode::Mapping(_)) {
            bail!(
                "The translated tree root for locale \"{}\" must be a mapping.",
                locale.code
            );
        }
        Ok(Self {
            locale,
            source,
            translated,
        })
    }

    /// The source message at a path; fails when the path does not name a
    /// message leaf.
    pub fn source_message(&self, path: &str) -> Result<&Message> {
        self.source
            .resolve(path)
            .and_then(MessageNode::as_leaf)
            .with_context(|| {
                format!(
                    "\"{}\" does not name a message leaf in the source tree.",
                    display_path(path)
                )
            })
    }

    /// The translated message at a path. Untouched or cleared paths read
    /// as the empty (untranslated) message.
    pub fn translated_message(&self, path: &str) -> Message {
        self.translated_at(path).cloned().unwrap_or_else(Message::empty)
    }

    fn translated_at(&self, path: &str) -> Option<&Message> {
        match self.translated.get(path) {
            Some(TranslatedNode::Leaf(message)) => Some(message),
            _ => None,
        }
    }

    /// Replace the translated value at a message leaf. A `Message` is
    /// well-formed by construction, so only the key is validated.
    pub fn set(&mut self, path: &str, message: Message) -> Result<()> {
        self.source_message(path)?;
        self.translated.insert(path, TranslatedNode::Leaf(message));
        Ok(())
    }

    /// Reset a message leaf to untranslated.
    pub fn delete(&mut self, path: &str) -> Result<()> {
        self.set(path, Message::empty())
    }

    /// Recursively clear the translated subtree at a path.
    pub fn clear(&mut self, path: &str) {
        self.translated.remove(path);
    }

    /// Depth-first traversal over every source message leaf; the visitor
    /// receives the path, the source message and the translated message.
    pub fn walk(
        &self,
        visitor: &mut dyn FnMut(&str, &Message, &Message) -> Result<()>,
    ) -> Result<()> {
        let empty = Message::empty();
        walk_source(self.source, "", &mut |path, source| {
            let translated = self.translated_at(path).unwrap_or(&empty);
            visitor(path, source, translated)
        })
    }

    /// Count of (untranslated, total) message leaves, for the coverage
    /// summary.
    pub fn untranslated_counts(&self) -> (usize, usize) {
        let mut untranslated = 0;
        let mut total = 0;
        let _ = self.walk(&mut |_, _, translated| {
            total += 1;
            if translated.is_empty() {
                untranslated += 1;
            }
            Ok(())
        });
        (untranslated, total)
    }

    /// Pass 1: partial-translation deletion.
    ///
    /// Arrays and component-interpolation groups render as one visible
    /// unit; a mix of translated and untranslated fragments would surface
    /// half-translated text, so any empty leaf clears the entire
    /// enclosing group.
    pub fn delete_partial_translations(&mut self) -> Result<()> {
        let mut to_clear = Vec::new();
        self.scan_partial(self.source, "", &mut to_clear)?;
        for path in to_clear {
            self.clear(&path);
        }
        Ok(())
    }

    fn scan_partial(
        &self,
        node: &MessageNode,
        path: &str,
        to_clear: &mut Vec<String>,
    ) -> Result<()> {
        match node {
            MessageNode::Leaf(_) => Ok(()),
            MessageNode::Sequence(_) => {
                if self.subtree_has_untranslated(node, path)? {
                    to_clear.push(path.to_string());
                }
                Ok(())
            }
            MessageNode::Mapping(mapping) if mapping.is_interpolation() => {
                if self.subtree_has_untranslated(node, path)? {
                    to_clear.push(path.to_string());
                }
                Ok(())
            }
            MessageNode::Mapping(mapping) => {
                for (key, child) in mapping.iter() {
                    self.scan_partial(child, &join_path(path, key), to_clear)?;
                }
                Ok(())
            }
        }
    }

    fn subtree_has_untranslated(&self, node: &MessageNode, path: &str) -> Result<bool> {
        let mut found = false;
        walk_source(node, path, &mut |leaf_path, source| {
            if link_path(source)?.is_some() {
                bail!(
                    "Link at \"{}\" sits inside an array or component-interpolation group; links are not allowed there.",
                    leaf_path
                );
            }
            if self.translated_at(leaf_path).is_none_or(Message::is_empty) {
                found = true;
            }
            Ok(())
        })?;
        Ok(found)
    }

    /// Pass 2a: linked-message copy.
    ///
    /// A link surfaces its target's text, so it is written out only once
    /// the target actually has a translation; the marker itself is copied
    /// verbatim and resolved by the consuming application.
    pub fn copy_linked_messages(&mut self) -> Result<()> {
        let mut links = Vec::new();
        walk_source(self.source, "", &mut |path, source| {
            if let Some(target) = link_path(source)? {
                links.push((path.to_string(), target, source.clone()));
            }
            Ok(())
        })?;

        for (path, target, marker) in links {
            resolve_link(self.source, &target, &path)?;
            if self.translated_message(&target).is_empty() {
                self.clear(&path);
            } else {
                self.set(&path, marker)?;
            }
        }
        Ok(())
    }

    /// Pass 2b: content validation.
    ///
    /// Untranslated leaves are skipped; partial payloads are contained by
    /// pass 1, not rejected here.
    pub fn validate(&self) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        self.walk(&mut |path, source, translated| {
            if translated.is_empty() {
                return Ok(());
            }

            if self.locale.is_pluralized() && source.is_plural() != translated.is_plural() {
                bail!(
                    "Pluralization mismatch at \"{}\" for locale \"{}\": the source has {} form(s) but the translation {:?} has {}.",
                    path,
                    self.locale.code,
                    source.variants().len(),
                    translated.variants(),
                    translated.variants().len()
                );
            }

            let source_vars = source.variables()?;
            let translated_vars = translated.variables()?;
            if source_vars != translated_vars {
                bail!(
                    "Variable mismatch at \"{}\" for locale \"{}\": the source uses [{}] but the translation {:?} uses [{}].",
                    path,
                    self.locale.code,
                    source_vars.join(", "),
                    translated.variants(),
                    translated_vars.join(", ")
                );
            }

            for (index, variant) in translated.variants().iter().enumerate() {
                if variant.contains(LINK_MARKER)
                    && source.variants().get(index) != Some(variant)
                {
                    bail!(
                        "Link marker in the translation {:?} at \"{}\" for locale \"{}\": translators must not introduce links.",
                        translated.variants(),
                        path,
                        self.locale.code
                    );
                }

                if self.locale.warn_on_missing_variable_separator
                    && crate::core::variables::has_glued_token(variant)
                {
                    issues.push(Issue::variable_spacing(
                        &self.locale.code,
                        path,
                        variant.clone(),
                    ));
                }
            }
            Ok(())
        })?;
        Ok(issues)
    }

    /// Serialize the translated tree back into the native shape.
    ///
    /// Untranslated leaves and fully empty containers are omitted. An
    /// array with some but not all elements empty cannot be represented
    /// and fails; pass 1 guarantees that state never survives to here.
    pub fn emit(&self) -> Result<Value> {
        Ok(self
            .emit_node(self.source, "")?
            .unwrap_or(Value::Object(Map::new())))
    }

    fn emit_node(&self, node: &MessageNode, path: &str) -> Result<Option<Value>> {
        match node {
            MessageNode::Leaf(_) => {
                let translated = self.translated_message(path);
                if translated.is_empty() {
                    return Ok(None);
                }
                let raw = translated.to_native().with_context(|| {
                    format!("Cannot encode the translation at \"{}\"", display_path(path))
                })?;
                Ok(Some(Value::String(raw)))
            }
            MessageNode::Mapping(mapping) => {
                let mut object = Map::new();
                for (key, child) in mapping.iter() {
                    if let Some(value) = self.emit_node(child, &join_path(path, key))? {
                        object.insert(key.to_string(), value);
                    }
                }
                if object.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Value::Object(object)))
            }
            MessageNode::Sequence(elements) => {
                let mut emitted = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    emitted.push(self.emit_node(element, &join_path(path, &index.to_string()))?);
                }
                let present = emitted.iter().filter(|value| value.is_some()).count();
                if present == 0 {
                    return Ok(None);
                }
                if present < emitted.len() {
                    bail!(
                        "Sparse array at \"{}\" for locale \"{}\": some elements are translated and some are not, which the native format cannot represent.",
                        display_path(path),
                        self.locale.code
                    );
                }
                Ok(Some(Value::Array(emitted.into_iter().flatten().collect())))
            }
        }
    }
}

/// Depth-first walk over a source subtree's message leaves.
fn walk_source(
    node: &MessageNode,
    path: &str,
    visitor: &mut dyn FnMut(&str, &Message) -> Result<()>,
) -> Result<()> {
    match node {
        MessageNode::Leaf(message) => visitor(path, message),
        MessageNode::Mapping(mapping) => {
            for (key, child) in mapping.iter() {
                walk_source(child, &join_path(path, key), visitor)?;
            }
            Ok(())
        }
        MessageNode::Sequence(elements) => {
            for (index, element) in elements.iter().enumerate() {
                walk_source(element, &join_path(path, &index.to_string()), visitor)?;
            }
            Ok(())
        }
    }
}

/// Source-locale self-check: restructuring and then destructuring the
/// source tree must reproduce it exactly.
///
/// Link leaves are excluded on both sides, since restructuring omits them
/// by design. Any difference is a defect in the converters, not in the
/// data.
pub fn verify_source_round_trip(
    root: &MessageNode,
    comments: &FileComments,
    locale: &Locale,
) -> Result<()> {
    let payload = restructure(root, comments)?;
    let translated = destructure(&payload, locale)
        .context("Source-locale round-trip: the exported payload does not destructure")?;
    let merge = MergeTree::new(root, locale, translated)?;
    let round_tripped = merge.emit()?;

    let expected = expected_native_value(root, "")?.unwrap_or(Value::Object(Map::new()));

    let round_tripped_text = serde_json::to_string(&round_tripped)?;
    let expected_text = serde_json::to_string(&expected)?;
    if round_tripped_text != expected_text {
        bail!(
            "Source-locale round-trip mismatch for \"{}\"; this is a converter defect, not a data problem.\nexpected: {}\ngot:      {}",
            locale.code,
            expected_text,
            round_tripped_text
        );
    }
    Ok(())
}

/// The native-shaped value of a source subtree with link leaves and empty
/// messages omitted, mirroring what a complete emission produces.
fn expected_native_value(node: &MessageNode, path: &str) -> Result<Option<Value>> {
    match node {
        MessageNode::Leaf(message) => {
            if message.is_empty() || link_path(message)?.is_some() {
                return Ok(None);
            }
            Ok(Some(Value::String(message.to_native()?)))
        }
        MessageNode::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, child) in mapping.iter() {
                if let Some(value) = expected_native_value(child, &join_path(path, key))? {
                    object.insert(key.to_string(), value);
                }
            }
            if object.is_empty() {
                return Ok(None);
            }
            Ok(Some(Value::Object(object)))
        }
        MessageNode::Sequence(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for (index, element) in elements.iter().enumerate() {
                if let Some(value) =
                    expected_native_value(element, &join_path(path, &index.to_string()))?
                {
                    values.push(value);
                }
            }
            if values.is_empty() {
                return Ok(None);
            }
            Ok(Some(Value::Array(values)))
        }
    }
}
