//! Cache port for heavy artifact attributes

use crate::{ArtifactId, Token};
use thiserror::Error;

/// Failure reported by a cache backend
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend failure: {0}")]
    Backend(String),

    #[error("corrupt cache entry for {id}: {reason}")]
    Corrupt { id: ArtifactId, reason: String },
}

/// Typed storage port for attributes evicted from the model
///
/// Entries are keyed by `(scope, artifact id, attribute)`; one method pair
/// per attribute kind. The whole analysis runs as a single sequential pass,
/// so implementations need no locking discipline.
pub trait CacheStore {
    /// Name of the scope this store writes to
    fn scope(&self) -> &str;

    /// Store the token list of an artifact, replacing any previous entry
    fn store_tokens(&mut self, id: ArtifactId, tokens: &[Token]) -> Result<(), CacheError>;

    /// Restore the token list of an artifact, `None` when never stored
    fn restore_tokens(&self, id: ArtifactId) -> Result<Option<Vec<Token>>, CacheError>;
}
