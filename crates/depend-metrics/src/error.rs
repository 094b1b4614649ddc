//! Error types for the analyzers

use depend_ast::{ModelError, TraversalError};
use depend_hierarchy::HierarchyError;
use thiserror::Error;

/// Errors that abort an analyzer run
///
/// An analyzer that returns one of these is back in its uninitialized
/// state; nothing of the aborted run is kept.
#[derive(Debug, Clone, Error)]
pub enum MetricsError {
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("unknown CodeRank strategy `{0}` (expected inheritance, property or method)")]
    UnknownStrategy(String),

    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}
