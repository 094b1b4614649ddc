//! Constant inheritance

use crate::{Hierarchy, HierarchyError};
use depend_ast::{ArtifactId, Constant, ConstantValue};
use std::collections::HashSet;

impl<'a> Hierarchy<'a> {
    /// Visible constants of a type
    ///
    /// Own declarations first, then each ancestor nearest first, then the
    /// interfaces. The first declaration of a name hides later ones.
    pub fn constants(&self, id: ArtifactId) -> Result<Vec<&'a Constant>, HierarchyError> {
        let model = self.model();
        let sources = std::iter::once(id)
            .chain(self.parent_chain(id)?)
            .chain(self.all_interfaces(id)?);

        let mut seen = HashSet::new();
        let mut constants = Vec::new();
        for source in sources {
            for constant in &model.type_data(source)?.constants {
                if seen.insert(constant.name.as_str()) {
                    constants.push(constant);
                }
            }
        }
        Ok(constants)
    }

    /// Whether a constant is visible, including one declared as `null`
    pub fn has_constant(&self, id: ArtifactId, name: &str) -> Result<bool, HierarchyError> {
        Ok(self.constant(id, name)?.is_some())
    }

    /// Value of a visible constant
    ///
    /// `None` means the constant is not declared anywhere in the hierarchy;
    /// `Some(ConstantValue::Null)` means it is declared as `null`.
    pub fn constant(
        &self,
        id: ArtifactId,
        name: &str,
    ) -> Result<Option<&'a ConstantValue>, HierarchyError> {
        Ok(self
            .constants(id)?
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| &c.value))
    }
}
