//! locsync - message-catalog sync for translation platforms
//!
//! locsync is a CLI tool and library that keeps a developer-authored,
//! nested message catalog (including pluralized strings, `{name}`
//! variables, linked messages and rich-text component interpolation) in
//! sync with a translation-management platform that only understands a
//! flat, array-free exchange format.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (user-facing commands and reporting)
//! - `config`: Configuration file loading and parsing
//! - `core`: Core transformation engine (registry, message type, converters, merge tree)
//! - `issues`: Non-fatal issue definitions and reporting
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;
