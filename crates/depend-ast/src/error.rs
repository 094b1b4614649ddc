//! Error types for the artifact model

use crate::{ArtifactId, CacheError};
use thiserror::Error;

/// Errors from building, querying or restoring the code model
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("unknown artifact {0}")]
    UnknownArtifact(ArtifactId),

    #[error("artifact {id} is not a {expected}")]
    WrongKind { id: ArtifactId, expected: &'static str },

    /// Rejected at assignment; the artifact is left unmodified
    #[error("invalid modifiers for `{name}`: {reason}")]
    InvalidModifiers { name: String, reason: &'static str },

    /// Modifiers are assigned once by the builder; a second call is a builder bug
    #[error("modifiers of `{name}` are already set")]
    ModifiersAlreadySet { name: String },

    /// Restoration could not find the registry entry it has to re-link to
    #[error("missing builder context: {0}")]
    MissingContext(String),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Errors raised while walking the model
#[derive(Debug, Clone, Error)]
pub enum TraversalError {
    #[error("expression nesting exceeds the limit of {limit}")]
    NestingLimit { limit: usize },

    #[error(transparent)]
    Model(#[from] ModelError),
}
