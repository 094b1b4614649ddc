//! depend-hierarchy: Type hierarchy resolution
//!
//! Queries over the inheritance structure of classes, interfaces and traits:
//! - Parent chain walking with cycle detection
//! - Transitive interface sets and subtype tests
//! - Constant inheritance
//! - Trait method composition with precedence, aliasing and collision rules
//!
//! Every query runs against a [`Scope`], so the artifact filter is an
//! explicit argument. Rejected artifacts are skipped silently and shorten
//! the result instead of failing it.
//!
//! # Example
//!
//! ```ignore
//! use depend_ast::{CodeModel, Scope};
//! use depend_hierarchy::Hierarchy;
//!
//! let model: CodeModel = load_model();
//! let hierarchy = Hierarchy::new(Scope::unfiltered(&model));
//! let user = model.lookup_type("app\\User").unwrap();
//! for ancestor in hierarchy.parent_chain(user)? {
//!     println!("{}", model.qualified_name(ancestor));
//! }
//! ```

mod chain;
mod composition;
mod constants;
mod error;

pub use composition::{
    compose, Composition, MethodEntry, MethodSource, MethodTable, ResolvedAlias,
    ResolvedPrecedence, TraitMethods,
};
pub use error::HierarchyError;

use depend_ast::{ArtifactId, ArtifactKind, CodeModel, Scope, TypeRef};
use tracing::debug;

/// Hierarchy queries over the types of a model
#[derive(Debug, Clone, Copy)]
pub struct Hierarchy<'a> {
    scope: Scope<'a>,
}

impl<'a> Hierarchy<'a> {
    pub fn new(scope: Scope<'a>) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> Scope<'a> {
        self.scope
    }

    pub fn model(&self) -> &'a CodeModel {
        self.scope.model
    }

    /// Resolve a reference to a type the filter accepts
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<ArtifactId> {
        self.model()
            .resolve(type_ref)
            .filter(|&id| self.scope.accepts(id))
    }

    /// Resolve a reference to an accepted type of the given kind
    fn resolve_kind(&self, type_ref: &TypeRef, kind: ArtifactKind) -> Option<ArtifactId> {
        self.resolve(type_ref)
            .filter(|&id| self.model().get(id).is_some_and(|a| a.kind() == kind))
    }

    fn recursion_error(&self, id: ArtifactId, path: &[ArtifactId], again: ArtifactId) -> HierarchyError {
        let model = self.model();
        let mut names: Vec<String> = path.iter().map(|&p| model.qualified_name(p)).collect();
        names.push(model.qualified_name(again));
        let type_name = model.qualified_name(id);
        let chain = names.join(" -> ");
        debug!(%type_name, %chain, "recursive inheritance");
        HierarchyError::RecursiveInheritance { type_name, chain }
    }
}
