//! Component-interpolation tree reconstruction.
//!
//! A rich-text message is authored as a flat sibling group: the `full` key
//! holds the surrounding text and every other key holds one fragment that
//! the UI layer splices in at that key's `{token}` position. The exchange
//! format cannot express that nesting, so it is reconstructed here from
//! token containment: message A's text contains `{b}`, therefore `b` is a
//! child of A.
//!
//! Parent discovery is a two-pass algorithm. The first pass indexes, for
//! every non-`full` key, which siblings mention its token; the second pass
//! assigns each key exactly one parent and fails on zero (orphan) or
//! several (ambiguous) candidates. The builder also produces the
//! translator-facing comments that describe how the fragments combine.

use std::collections::HashMap;

use anyhow::{Result, bail};

use crate::core::message::Message;
use crate::core::tree::{FULL_KEY, Mapping, display_path};
use crate::core::variables::token;

/// The reconstructed nesting of one component-interpolation group.
#[derive(Debug)]
pub struct InterpolationTree<'g> {
    keys: Vec<&'g str>,
    messages: HashMap<&'g str, &'g Message>,
    children: HashMap<&'g str, Vec<&'g str>>,
}

impl<'g> InterpolationTree<'g> {
    /// Build the tree for a sibling group containing a `full` key.
    pub fn build(group: &'g Mapping, path: &str) -> Result<Self> {
        debug_assert!(group.is_interpolation());

        let mut keys = Vec::with_capacity(group.len());
        let mut messages = HashMap::new();
        for (key, node) in group.iter() {
            let Some(message) = node.as_leaf() else {
                bail!(
                    "\"{}\" inside the component-interpolation group at \"{}\" is not a plain message.",
                    key,
                    display_path(path)
                );
            };
            keys.push(key);
            messages.insert(key, message);
        }

        // Pass 1: index which siblings mention each key's token.
        let mut candidates: HashMap<&str, Vec<&str>> = HashMap::new();
        for &key in &keys {
            if key == FULL_KEY {
                continue;
            }
            let needle = token(key);
            let parents: Vec<&str> = keys
                .iter()
                .copied()
                .filter(|&sibling| {
                    sibling != key && messages[sibling].first_variant().contains(&needle)
                })
                .collect();
            candidates.insert(key, parents);
        }

        // Pass 2: each key gets exactly one parent.
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for &key in &keys {
            if key == FULL_KEY {
                continue;
            }
            match candidates[key].as_slice() {
                [parent] => children.entry(*parent).or_default().push(key),
                [] => bail!(
                    "Orphan key \"{}\" in the component-interpolation group at \"{}\": no sibling text contains {}.",
                    key,
                    display_path(path),
                    token(key)
                ),
                parents => bail!(
                    "Ambiguous key \"{}\" in the component-interpolation group at \"{}\": {} appears in several sibling texts ({}).",
                    key,
                    display_path(path),
                    token(key),
                    parents.join(", ")
                ),
            }
        }

        let tree = Self {
            keys,
            messages,
            children,
        };

        if tree.children_of(FULL_KEY).is_empty() {
            bail!(
                "Malformed component-interpolation group at \"{}\": \"full\" has no children.",
                display_path(path)
            );
        }

        // Every key must be reachable from the root; a parent assignment
        // that loops among fragments would otherwise pass silently.
        let mut reachable = vec![FULL_KEY];
        let mut index = 0;
        while index < reachable.len() {
            let key = reachable[index];
            index += 1;
            reachable.extend(tree.children_of(key));
        }
        for &key in &tree.keys {
            if !reachable.contains(&key) {
                bail!(
                    "Cyclic reference for key \"{}\" in the component-interpolation group at \"{}\": it is not reachable from \"full\".",
                    key,
                    display_path(path)
                );
            }
        }

        Ok(tree)
    }

    fn children_of(&self, key: &str) -> &[&'g str] {
        self.children.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn message(&self, key: &str) -> &'g Message {
        self.messages[key]
    }

    /// Generate the translator-facing comment for each key.
    ///
    /// Fragment keys get a comment quoting the surrounding text with their
    /// own token expanded (biased to the final plural form, the one
    /// translators should expect); keys with children additionally get a
    /// listing of the fragments that are translated separately.
    pub fn comments(&self) -> HashMap<String, String> {
        let mut fragment_comments = HashMap::new();
        self.collect_fragment_comments(
            FULL_KEY,
            self.message(FULL_KEY).last_variant(),
            &mut fragment_comments,
        );

        let mut comments = HashMap::new();
        for &key in &self.keys {
            let mut parts = Vec::new();
            if let Some(fragment) = fragment_comments.get(key) {
                parts.push(fragment.clone());
            }
            if let Some(listing) = self.listing_comment(key) {
                parts.push(listing);
            }
            if !parts.is_empty() {
                comments.insert(key.to_string(), parts.join("\n"));
            }
        }
        comments
    }

    fn collect_fragment_comments(
        &self,
        key: &str,
        surrounding: &str,
        out: &mut HashMap<&'g str, String>,
    ) {
        for &child in self.children_of(key) {
            let expanded =
                surrounding.replace(&token(child), self.message(child).last_variant());
            out.insert(
                child,
                format!(
                    "This text is inserted into richer formatting at the {} position. The combined text reads: \"{}\"",
                    token(child),
                    expanded
                ),
            );
            self.collect_fragment_comments(child, &expanded, out);
        }
    }

    fn listing_comment(&self, key: &str) -> Option<String> {
        let children = self.children_of(key);
        if children.is_empty() {
            return None;
        }

        if children.len() == 1 && self.children_of(children[0]).is_empty() {
            let only = children[0];
            return Some(format!(
                "The {} fragment is a separately translated string: \"{}\"",
                token(only),
                self.message(only).last_variant()
            ));
        }

        let mut lines = vec!["The following fragments are translated separately:".to_string()];
        self.collect_leaf_listing(key, &mut lines);
        Some(lines.join("\n"))
    }

    fn collect_leaf_listing(&self, key: &str, lines: &mut Vec<String>) {
        for &child in self.children_of(key) {
            if self.children_of(child).is_empty() {
                lines.push(format!(
                    "{}: \"{}\"",
                    token(child),
                    self.message(child).last_variant()
                ));
            } else {
                self.collect_leaf_listing(child, lines);
            }
        }
    }
}
