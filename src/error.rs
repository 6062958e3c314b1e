//! Error types surfaced by reflection and rendering.
//!
//! Only a handful of conditions are errors.  Incomplete or partially
//! invalid input (unknown supertypes, unparseable type tokens, malformed
//! docblock tags, missing documentation) degrades to a default value and
//! is logged instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::renderer::VariantKey;

/// Errors returned by the [`Reflector`](crate::Reflector) and symbol
/// collections.
#[derive(Debug, Error)]
pub enum ReflectionError {
    /// The parser could not make anything of the source text at all.
    #[error("Failed to parse source: {0}")]
    Parse(String),

    /// A collection lookup or locator query came back empty.
    #[error("{}", not_found_message(kind, name.as_deref()))]
    NotFound {
        kind: &'static str,
        /// `None` when asking for the first element of an empty collection.
        name: Option<String>,
    },

    /// The offset lies outside the source or inside a multi-byte character.
    #[error("Offset {offset} is not a valid position in a source of {len} bytes")]
    InvalidOffset { offset: usize, len: usize },
}

impl ReflectionError {
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        ReflectionError::NotFound {
            kind,
            name: Some(name.into()),
        }
    }
}

fn not_found_message(kind: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{kind} \"{name}\" not found"),
        None => format!("No {kind} found"),
    }
}

/// Errors returned by the [`ObjectRenderer`](crate::ObjectRenderer).
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template for the variant and no eligible fallback.
    #[error("No template registered for \"{0}\"")]
    TemplateNotFound(VariantKey),

    /// A template failed to compile or to render.
    #[error("Template \"{name}\" failed: {message}")]
    Template { name: String, message: String },

    #[error("Failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
