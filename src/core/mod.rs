//! Core transformation engine.
//!
//! Everything in here is synchronous, in-memory tree work: the locale
//! registry, the message value type, link resolution, interpolation-tree
//! reconstruction, the restructure/destructure converters and the
//! translation merge tree. File and CLI orchestration lives in `cli`.

pub mod destructure;
pub mod interpolation;
pub mod link;
pub mod locales;
pub mod merge;
pub mod message;
pub mod parsers;
pub mod restructure;
pub mod tree;
pub mod variables;

pub use destructure::{TranslatedNode, destructure};
pub use locales::{Locale, LocaleRegistry};
pub use merge::{MergeTree, verify_source_round_trip};
pub use message::Message;
pub use parsers::json::{FileComments, ParsedCatalog};
pub use restructure::restructure;
pub use tree::{Mapping, MessageNode};
