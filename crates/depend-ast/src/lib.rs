//! depend AST - Code artifact model
//!
//! This crate defines the in-memory code model the analyzers work on:
//! - Artifacts (namespaces, classes, interfaces, traits, methods, functions,
//!   properties) stored in an arena and addressed by [`ArtifactId`]
//! - The name-indexed registry used to resolve forward type references
//! - The typed cache port heavy attributes (token lists) can be evicted to
//! - Artifact filters and the depth-first traversal protocol
//!
//! The model is filled by an external builder (the parser front end) and is
//! read-only during analysis.

mod artifact;
mod cache;
mod error;
mod expr;
mod filter;
mod id;
mod model;
mod modifiers;
mod scope;
mod snapshot;
mod token;
pub mod visit;

pub use artifact::*;
pub use cache::{CacheError, CacheStore};
pub use error::{ModelError, TraversalError};
pub use expr::{Expr, ExprKind};
pub use filter::{AcceptAll, ArtifactFilter, FilterChain, NamespaceFilter};
pub use id::{ArtifactId, UnitId};
pub use model::{qualify, CodeModel, CompilationUnit, Registry};
pub use modifiers::Modifiers;
pub use scope::{Scope, DEFAULT_NESTING_LIMIT};
pub use snapshot::{MemberSnapshot, TypeSnapshot};
pub use token::{line_bounds, Token};
pub use visit::{Node, Visitor};
