//! Parent chains, interface closure and subtype tests

use crate::{Hierarchy, HierarchyError};
use depend_ast::{ArtifactId, ArtifactKind};
use std::collections::{HashSet, VecDeque};

impl<'a> Hierarchy<'a> {
    /// Direct parent of a type, `None` if absent, unresolved or filtered
    ///
    /// A type naming itself as parent is recursive inheritance.
    pub fn parent(&self, id: ArtifactId) -> Result<Option<ArtifactId>, HierarchyError> {
        let data = self.model().type_data(id)?;
        match data.parent.as_ref().and_then(|p| self.resolve(p)) {
            Some(parent) if parent == id => Err(self.recursion_error(id, &[id], id)),
            parent => Ok(parent),
        }
    }

    /// Ancestors of a type, nearest first
    ///
    /// Fails the moment a type reappears, including a type naming itself as
    /// parent. A filtered ancestor ends the chain.
    pub fn parent_chain(&self, id: ArtifactId) -> Result<Vec<ArtifactId>, HierarchyError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = id;

        while let Some(parent) = self.parent(current)? {
            if !seen.insert(parent) {
                let mut path = vec![id];
                path.extend(&chain);
                return Err(self.recursion_error(id, &path, parent));
            }
            chain.push(parent);
            current = parent;
        }
        Ok(chain)
    }

    /// Transitive closure of implemented and extended interfaces
    ///
    /// Collected from the type itself, then every ancestor, then the
    /// `extends` lists of the interfaces found so far. Deduplicated, in
    /// discovery order.
    pub fn all_interfaces(&self, id: ArtifactId) -> Result<Vec<ArtifactId>, HierarchyError> {
        let model = self.model();
        let mut queue = VecDeque::new();
        for source in std::iter::once(id).chain(self.parent_chain(id)?) {
            queue.extend(model.type_data(source)?.interfaces.iter());
        }

        let mut seen = HashSet::from([id]);
        let mut interfaces = Vec::new();
        while let Some(type_ref) = queue.pop_front() {
            let Some(interface) = self.resolve_kind(type_ref, ArtifactKind::Interface) else {
                continue;
            };
            if !seen.insert(interface) {
                continue;
            }
            interfaces.push(interface);
            queue.extend(model.type_data(interface)?.interfaces.iter());
        }
        Ok(interfaces)
    }

    /// Whether `id` is `other`, extends it or implements it
    pub fn is_subtype_of(&self, id: ArtifactId, other: ArtifactId) -> Result<bool, HierarchyError> {
        if id == other {
            return Ok(true);
        }
        if self.parent_chain(id)?.contains(&other) {
            return Ok(true);
        }
        Ok(self.all_interfaces(id)?.contains(&other))
    }

    /// Direct dependencies of a type: its parent and declared interfaces
    pub fn dependencies(&self, id: ArtifactId) -> Result<Vec<ArtifactId>, HierarchyError> {
        let data = self.model().type_data(id)?;
        let mut dependencies: Vec<ArtifactId> = self.parent(id)?.into_iter().collect();
        for type_ref in &data.interfaces {
            if let Some(interface) = self.resolve(type_ref) {
                if !dependencies.contains(&interface) {
                    dependencies.push(interface);
                }
            }
        }
        Ok(dependencies)
    }
}
