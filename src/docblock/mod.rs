//! PHPDoc block parsing.
//!
//! This module turns doc comments (`/** ... */`) into a tolerant, typed
//! intermediate form before any type string reaches the
//! [`TypeResolver`](crate::TypeResolver).  Malformed input never fails:
//! text that is not a tag is prose, and a tag that cannot be understood is
//! skipped by whoever consumes it.
//!
//! # Submodules
//!
//! - [`tags`]: the [`DocBlock`] parser, `@param` / `@var` / `@return` /
//!   `@deprecated` accessors, docblock lookup through the trivia list, and
//!   HTML stripping for hover text.
//! - [`virtual_members`]: `@property` and `@method` tag extraction.
//! - [`types`]: token-level helpers (`clean_type`, `split_union`,
//!   `split_type_token`).

mod tags;
pub(crate) mod types;
mod virtual_members;

// ─── Re-exports ─────────────────────────────────────────────────────────────

pub use tags::{DocBlock, Tag, strip_html_tags};
pub(crate) use tags::docblock_text_for_node;

pub use virtual_members::{MethodTag, MethodTagParameter, PropertyTag, method_tags, property_tags};
