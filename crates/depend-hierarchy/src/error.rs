//! Error types for hierarchy queries

use depend_ast::ModelError;
use thiserror::Error;

/// Errors from hierarchy queries
///
/// Each error is fatal to the query that raised it only; callers treat the
/// type as unanalyzable and carry on with the others.
#[derive(Debug, Clone, Error)]
pub enum HierarchyError {
    /// A type reappears in its own parent chain or trait usage
    #[error("recursive inheritance of `{type_name}`: {chain}")]
    RecursiveInheritance {
        type_name: String,
        /// Full cycle path, e.g. "app\A -> app\B -> app\A"
        chain: String,
    },

    /// Two trait methods share a name and no rule resolves the conflict
    #[error("trait method `{method}` collides with another trait method in `{type_name}`")]
    MethodCollision { method: String, type_name: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}
