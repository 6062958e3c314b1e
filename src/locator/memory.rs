use std::collections::HashMap;

use parking_lot::RwLock;

use super::{SourceLocator, declared_names, index_key};
use crate::error::ReflectionError;

/// In-memory locator for sources that only exist in the editor buffer or
/// in a test.
///
/// The map sits behind a lock so an `Arc<TemporarySourceLocator>` shared
/// with a built reflector can still be filled in afterwards.
#[derive(Debug, Default)]
pub struct TemporarySourceLocator {
    sources: RwLock<HashMap<String, String>>,
}

impl TemporarySourceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` under every class-like and function it declares.
    /// Returns how many names were registered.
    pub fn set_source(&self, source: impl Into<String>) -> usize {
        let source = source.into();
        let names = declared_names(&source);
        let mut sources = self.sources.write();
        for name in &names {
            sources.insert(name.clone(), source.clone());
        }
        tracing::debug!("temporary locator: registered {} names", names.len());
        names.len()
    }

    /// Register `source` under `name` explicitly.
    pub fn insert(&self, name: &str, source: impl Into<String>) {
        self.sources.write().insert(index_key(name), source.into());
    }

    pub fn clear(&self) {
        self.sources.write().clear();
    }
}

impl SourceLocator for TemporarySourceLocator {
    fn locate(&self, name: &str) -> Result<String, ReflectionError> {
        self.sources
            .read()
            .get(&index_key(name))
            .cloned()
            .ok_or_else(|| ReflectionError::not_found("source", name.trim_start_matches('\\')))
    }
}
