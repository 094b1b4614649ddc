//! Artifact and compilation unit identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of an artifact in a [`CodeModel`](crate::CodeModel)
///
/// Assigned exactly once, when the builder creates the artifact, and kept
/// through cache eviction, snapshots and whole-model serialization. It is
/// also the artifact's arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactId(pub u32);

impl ArtifactId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a compilation unit (source file)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);
