//! Linked-message detection and resolution.
//!
//! A message whose entire value is `@:some.other.path` is a link: it
//! duplicates the value of the message at that path. Links exist only as
//! whole, single-form messages; they are stripped from the exchange
//! payload and re-filled at merge time from the target's translation.

use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

use crate::core::message::Message;
use crate::core::tree::{MessageNode, display_path};

/// Substring that introduces a linked-message reference.
pub const LINK_MARKER: &str = "@:";

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@:([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)$").expect("valid regex")
});

/// Returns the referenced path when the message is a link.
///
/// A link is a single-variant message that consists of nothing but the
/// marker and a dotted path. A multi-variant message containing the marker
/// anywhere is an error: links cannot be pluralized, and a marker inside
/// one plural form of several is always a mistake.
pub fn link_path(message: &Message) -> Result<Option<String>> {
    if message.is_plural() {
        if message.variants().iter().any(|v| v.contains(LINK_MARKER)) {
            bail!(
                "Link marker inside a pluralized message {:?}: links are whole, single-form messages.",
                message.variants()
            );
        }
        return Ok(None);
    }
    Ok(LINK_PATTERN
        .captures(message.first_variant())
        .map(|captures| captures[1].to_string()))
}

/// Dereference a link against the tree root.
///
/// The target must exist, must be a plain message, and must not itself be
/// a link (chains would make partial-translation cleanup order-dependent).
pub fn resolve_link<'tree>(
    root: &'tree MessageNode,
    target_path: &str,
    from_path: &str,
) -> Result<&'tree Message> {
    let Some(target) = root.resolve(target_path) else {
        bail!(
            "Link at \"{}\" references \"{}\", which does not exist.",
            display_path(from_path),
            target_path
        );
    };
    let Some(message) = target.as_leaf() else {
        bail!(
            "Link at \"{}\" references \"{}\", which is not a plain message.",
            display_path(from_path),
            target_path
        );
    };
    if link_path(message)?.is_some() {
        bail!(
            "Link at \"{}\" references \"{}\", which is itself a link; chained links are not allowed.",
            display_path(from_path),
            target_path
        );
    }
    Ok(message)
}
