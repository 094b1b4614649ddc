//! Analysis scope: the model together with the active filter

use crate::{AcceptAll, ArtifactFilter, ArtifactId, CodeModel};

/// Maximum expression nesting depth walked before traversal fails
pub const DEFAULT_NESTING_LIMIT: usize = 8192;

static ACCEPT_ALL: AcceptAll = AcceptAll;

/// Read-only view handed to the hierarchy resolver, visitors and analyzers
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    pub model: &'a CodeModel,
    pub filter: &'a dyn ArtifactFilter,
    pub max_nesting: usize,
}

impl<'a> Scope<'a> {
    pub fn new(model: &'a CodeModel, filter: &'a dyn ArtifactFilter) -> Self {
        Self {
            model,
            filter,
            max_nesting: DEFAULT_NESTING_LIMIT,
        }
    }

    pub fn unfiltered(model: &'a CodeModel) -> Self {
        Self::new(model, &ACCEPT_ALL)
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Whether the artifact exists and passes the filter
    pub fn accepts(&self, id: ArtifactId) -> bool {
        self.model.get(id).is_some() && self.filter.accept(self.model, id)
    }
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("model", self.model)
            .field("max_nesting", &self.max_nesting)
            .finish()
    }
}
