//! In-memory cache store

use depend_ast::{ArtifactId, CacheError, CacheStore, Token};
use std::collections::HashMap;

/// In-memory cache store
///
/// Keeps evicted attributes in a map for the lifetime of the store. All
/// data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryCache {
    scope: String,
    tokens: HashMap<ArtifactId, Vec<Token>>,
}

impl MemoryCache {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            tokens: HashMap::new(),
        }
    }

    /// Number of stored token lists
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn store_tokens(&mut self, id: ArtifactId, tokens: &[Token]) -> Result<(), CacheError> {
        self.tokens.insert(id, tokens.to_vec());
        Ok(())
    }

    fn restore_tokens(&self, id: ArtifactId) -> Result<Option<Vec<Token>>, CacheError> {
        Ok(self.tokens.get(&id).cloned())
    }
}
