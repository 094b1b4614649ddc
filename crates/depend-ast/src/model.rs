//! The code model arena and its builder operations

use crate::{
    line_bounds, Artifact, ArtifactData, ArtifactId, ArtifactKind, CacheStore, ModelError,
    Modifiers, NamespaceData, PropertyData, RoutineData, Token, TypeData, TypeRef, UnitId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Qualified name of a type or function: `app\User`, or `User` in the
/// global namespace.
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}\\{}", namespace, name)
    }
}

/// A source file owning artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub name: Option<String>,
}

impl CompilationUnit {
    /// Whether the unit carries a non-empty file name
    pub fn is_named(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// Name-indexed lookup of namespaces, types and functions
///
/// This is the builder context: forward references resolve through it and
/// restored artifacts re-register into it. Keys are case-insensitive.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    namespaces: HashMap<String, ArtifactId>,
    types: HashMap<String, ArtifactId>,
    functions: HashMap<String, ArtifactId>,
}

impl Registry {
    fn key(name: &str) -> String {
        name.trim_start_matches('\\').to_lowercase()
    }

    pub fn register_namespace(&mut self, name: &str, id: ArtifactId) {
        self.namespaces.insert(Self::key(name), id);
    }

    pub fn register_type(&mut self, qualified: &str, id: ArtifactId) {
        self.types.insert(Self::key(qualified), id);
    }

    pub fn register_function(&mut self, qualified: &str, id: ArtifactId) {
        self.functions.insert(Self::key(qualified), id);
    }

    pub fn namespace(&self, name: &str) -> Option<ArtifactId> {
        self.namespaces.get(&Self::key(name)).copied()
    }

    pub fn type_named(&self, qualified: &str) -> Option<ArtifactId> {
        self.types.get(&Self::key(qualified)).copied()
    }

    pub fn function(&self, qualified: &str) -> Option<ArtifactId> {
        self.functions.get(&Self::key(qualified)).copied()
    }

    pub fn clear(&mut self) {
        self.namespaces.clear();
        self.types.clear();
        self.functions.clear();
    }
}

/// Arena of all artifacts of one analysis run
///
/// Parent, namespace and member links are plain [`ArtifactId`]s, so cyclic
/// hierarchies are ordinary data. After deserializing a model call
/// [`CodeModel::reindex`] to rebuild the registry.
#[derive(Default, Serialize, Deserialize)]
pub struct CodeModel {
    artifacts: Vec<Artifact>,
    units: Vec<CompilationUnit>,
    namespaces: Vec<ArtifactId>,
    #[serde(skip)]
    registry: Registry,
    #[serde(skip)]
    cache: Option<Box<dyn CacheStore>>,
}

impl fmt::Debug for CodeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeModel")
            .field("artifacts", &self.artifacts.len())
            .field("units", &self.units.len())
            .field("namespaces", &self.namespaces)
            .field("cache", &self.cache.as_ref().map(|c| c.scope().to_string()))
            .finish()
    }
}

impl CodeModel {
    pub fn new() -> Self {
        Self::default()
    }

    // === Builder operations ===

    fn push(&mut self, kind: ArtifactKind, name: &str) -> ArtifactId {
        let id = ArtifactId(self.artifacts.len() as u32);
        self.artifacts.push(Artifact::new(id, kind, name.to_string()));
        id
    }

    /// Get or create the namespace with the given name
    pub fn add_namespace(&mut self, name: &str) -> ArtifactId {
        if let Some(id) = self.registry.namespace(name) {
            return id;
        }
        let id = self.push(ArtifactKind::Namespace, name);
        self.registry.register_namespace(name, id);
        self.namespaces.push(id);
        id
    }

    /// Create a class, interface or trait inside a namespace
    pub fn add_type(
        &mut self,
        namespace: ArtifactId,
        kind: ArtifactKind,
        name: &str,
    ) -> Result<ArtifactId, ModelError> {
        if !kind.is_type() {
            return Err(ModelError::WrongKind {
                id: namespace,
                expected: "type kind",
            });
        }
        self.namespace_data(namespace)?;
        let namespace_name = self.artifact(namespace)?.name.clone();

        let id = self.push(kind, name);
        if let ArtifactData::Type(data) = &mut self.artifacts[id.index()].data {
            data.namespace = Some(namespace);
            data.namespace_name = namespace_name.clone();
        }
        self.namespace_data_mut(namespace)?.types.push(id);
        self.registry.register_type(&qualify(&namespace_name, name), id);
        Ok(id)
    }

    pub fn add_class(&mut self, namespace: ArtifactId, name: &str) -> Result<ArtifactId, ModelError> {
        self.add_type(namespace, ArtifactKind::Class, name)
    }

    pub fn add_interface(
        &mut self,
        namespace: ArtifactId,
        name: &str,
    ) -> Result<ArtifactId, ModelError> {
        self.add_type(namespace, ArtifactKind::Interface, name)
    }

    pub fn add_trait(&mut self, namespace: ArtifactId, name: &str) -> Result<ArtifactId, ModelError> {
        self.add_type(namespace, ArtifactKind::Trait, name)
    }

    /// Create a method on a type; the type becomes its parent
    pub fn add_method(&mut self, owner: ArtifactId, name: &str) -> Result<ArtifactId, ModelError> {
        self.type_data(owner)?;
        let id = self.push(ArtifactKind::Method, name);
        if let ArtifactData::Routine(routine) = &mut self.artifacts[id.index()].data {
            routine.parent = Some(owner);
        }
        self.inherit_unit(owner, id);
        self.type_data_mut(owner)?.members.push(id);
        Ok(id)
    }

    /// Create a property on a type; the type becomes its parent
    pub fn add_property(&mut self, owner: ArtifactId, name: &str) -> Result<ArtifactId, ModelError> {
        self.type_data(owner)?;
        let id = self.push(ArtifactKind::Property, name);
        if let ArtifactData::Property(property) = &mut self.artifacts[id.index()].data {
            property.parent = Some(owner);
        }
        self.inherit_unit(owner, id);
        self.type_data_mut(owner)?.members.push(id);
        Ok(id)
    }

    /// Create a function inside a namespace
    pub fn add_function(
        &mut self,
        namespace: ArtifactId,
        name: &str,
    ) -> Result<ArtifactId, ModelError> {
        let namespace_name = self.artifact(namespace)?.name.clone();
        self.namespace_data(namespace)?;
        let id = self.push(ArtifactKind::Function, name);
        if let ArtifactData::Routine(routine) = &mut self.artifacts[id.index()].data {
            routine.parent = Some(namespace);
        }
        self.namespace_data_mut(namespace)?.functions.push(id);
        self.registry
            .register_function(&qualify(&namespace_name, name), id);
        Ok(id)
    }

    pub fn add_compilation_unit(&mut self, name: Option<&str>) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        self.units.push(CompilationUnit {
            name: name.map(str::to_string),
        });
        id
    }

    pub fn compilation_unit(&self, id: UnitId) -> Option<&CompilationUnit> {
        self.units.get(id.0 as usize)
    }

    /// Assign the owning compilation unit
    ///
    /// Ignored when the artifact already belongs to a named unit.
    pub fn set_compilation_unit(&mut self, id: ArtifactId, unit: UnitId) -> Result<(), ModelError> {
        let current = self.artifact(id)?.unit();
        let named = current
            .and_then(|u| self.compilation_unit(u))
            .is_some_and(CompilationUnit::is_named);
        if !named {
            self.artifact_mut(id)?.assign_unit(unit);
        }
        Ok(())
    }

    fn inherit_unit(&mut self, from: ArtifactId, to: ArtifactId) {
        let unit = self.artifacts.get(from.index()).and_then(Artifact::unit);
        if let (Some(unit), Some(child)) = (unit, self.artifacts.get_mut(to.index())) {
            if child.unit().is_none() {
                child.assign_unit(unit);
            }
        }
    }

    /// Assign modifiers once; invalid combinations leave the artifact unchanged
    pub fn set_modifiers(&mut self, id: ArtifactId, modifiers: Modifiers) -> Result<(), ModelError> {
        self.artifact_mut(id)?.set_modifiers(modifiers)
    }

    // === Lookup ===

    pub fn get(&self, id: ArtifactId) -> Option<&Artifact> {
        self.artifacts.get(id.index())
    }

    pub fn artifact(&self, id: ArtifactId) -> Result<&Artifact, ModelError> {
        self.artifacts
            .get(id.index())
            .ok_or(ModelError::UnknownArtifact(id))
    }

    pub fn artifact_mut(&mut self, id: ArtifactId) -> Result<&mut Artifact, ModelError> {
        self.artifacts
            .get_mut(id.index())
            .ok_or(ModelError::UnknownArtifact(id))
    }

    pub fn namespace_data(&self, id: ArtifactId) -> Result<&NamespaceData, ModelError> {
        self.artifact(id)?.as_namespace().ok_or(ModelError::WrongKind {
            id,
            expected: "namespace",
        })
    }

    fn namespace_data_mut(&mut self, id: ArtifactId) -> Result<&mut NamespaceData, ModelError> {
        match &mut self.artifact_mut(id)?.data {
            ArtifactData::Namespace(ns) => Ok(ns),
            _ => Err(ModelError::WrongKind {
                id,
                expected: "namespace",
            }),
        }
    }

    pub fn type_data(&self, id: ArtifactId) -> Result<&TypeData, ModelError> {
        self.artifact(id)?.as_type().ok_or(ModelError::WrongKind {
            id,
            expected: "type",
        })
    }

    pub fn type_data_mut(&mut self, id: ArtifactId) -> Result<&mut TypeData, ModelError> {
        match &mut self.artifact_mut(id)?.data {
            ArtifactData::Type(t) => Ok(t),
            _ => Err(ModelError::WrongKind {
                id,
                expected: "type",
            }),
        }
    }

    pub fn routine(&self, id: ArtifactId) -> Result<&RoutineData, ModelError> {
        self.artifact(id)?.as_routine().ok_or(ModelError::WrongKind {
            id,
            expected: "routine",
        })
    }

    pub fn routine_mut(&mut self, id: ArtifactId) -> Result<&mut RoutineData, ModelError> {
        match &mut self.artifact_mut(id)?.data {
            ArtifactData::Routine(r) => Ok(r),
            _ => Err(ModelError::WrongKind {
                id,
                expected: "routine",
            }),
        }
    }

    pub fn property(&self, id: ArtifactId) -> Result<&PropertyData, ModelError> {
        self.artifact(id)?.as_property().ok_or(ModelError::WrongKind {
            id,
            expected: "property",
        })
    }

    pub fn property_mut(&mut self, id: ArtifactId) -> Result<&mut PropertyData, ModelError> {
        match &mut self.artifact_mut(id)?.data {
            ArtifactData::Property(p) => Ok(p),
            _ => Err(ModelError::WrongKind {
                id,
                expected: "property",
            }),
        }
    }

    /// Namespaces in creation order
    pub fn namespaces(&self) -> &[ArtifactId] {
        &self.namespaces
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve a type reference through the registry
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<ArtifactId> {
        self.registry.type_named(&type_ref.name)
    }

    pub fn lookup_type(&self, qualified: &str) -> Option<ArtifactId> {
        self.registry.type_named(qualified)
    }

    pub fn lookup_namespace(&self, name: &str) -> Option<ArtifactId> {
        self.registry.namespace(name)
    }

    pub fn lookup_function(&self, qualified: &str) -> Option<ArtifactId> {
        self.registry.function(qualified)
    }

    /// Namespace an artifact belongs to
    pub fn namespace_of(&self, id: ArtifactId) -> Option<ArtifactId> {
        let artifact = self.get(id)?;
        match artifact.kind() {
            ArtifactKind::Namespace => Some(id),
            ArtifactKind::Class | ArtifactKind::Interface | ArtifactKind::Trait => {
                artifact.as_type()?.namespace
            }
            ArtifactKind::Function => artifact.parent(),
            ArtifactKind::Method | ArtifactKind::Property => {
                self.namespace_of(artifact.parent()?)
            }
        }
    }

    /// Qualified name of an artifact: `app\User`, `app\User::save`
    pub fn qualified_name(&self, id: ArtifactId) -> String {
        let Some(artifact) = self.get(id) else {
            return String::new();
        };
        match artifact.kind() {
            ArtifactKind::Namespace => artifact.name.clone(),
            ArtifactKind::Method | ArtifactKind::Property => match artifact.parent() {
                Some(owner) => format!("{}::{}", self.qualified_name(owner), artifact.name),
                None => artifact.name.clone(),
            },
            _ => {
                let namespace = self
                    .namespace_of(id)
                    .and_then(|ns| self.get(ns))
                    .map(|ns| ns.name.as_str())
                    .unwrap_or("");
                qualify(namespace, &artifact.name)
            }
        }
    }

    /// Rebuild the registry from the arena, e.g. after deserialization
    ///
    /// Members without a compilation unit take the one of their type.
    pub fn reindex(&mut self) {
        self.registry.clear();
        for artifact in &self.artifacts {
            let id = artifact.id();
            match &artifact.data {
                ArtifactData::Namespace(_) => self.registry.register_namespace(&artifact.name, id),
                ArtifactData::Type(t) => self
                    .registry
                    .register_type(&qualify(&t.namespace_name, &artifact.name), id),
                ArtifactData::Routine(_) if artifact.kind() == ArtifactKind::Function => {
                    let namespace = artifact
                        .parent()
                        .and_then(|ns| self.artifacts.get(ns.index()))
                        .map(|ns| ns.name.as_str())
                        .unwrap_or("");
                    self.registry
                        .register_function(&qualify(namespace, &artifact.name), id);
                }
                _ => {}
            }
        }

        let owned: Vec<(ArtifactId, Vec<ArtifactId>)> = self
            .artifacts
            .iter()
            .filter_map(|a| match &a.data {
                ArtifactData::Type(t) => Some((a.id(), t.members.clone())),
                _ => None,
            })
            .collect();
        for (owner, members) in owned {
            for member in members {
                self.inherit_unit(owner, member);
            }
        }
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub(crate) fn replace(&mut self, artifact: Artifact) -> Result<(), ModelError> {
        let id = artifact.id();
        let slot = self
            .artifacts
            .get_mut(id.index())
            .ok_or(ModelError::UnknownArtifact(id))?;
        *slot = artifact;
        Ok(())
    }

    pub(crate) fn register_in_namespace(
        &mut self,
        namespace: ArtifactId,
        id: ArtifactId,
    ) -> Result<(), ModelError> {
        let ns = self.namespace_data_mut(namespace)?;
        if !ns.types.contains(&id) {
            ns.types.push(id);
        }
        Ok(())
    }

    // === Token cache ===

    /// Attach a cache store; token lists set afterwards are written to it
    pub fn attach_cache(&mut self, cache: Box<dyn CacheStore>) {
        self.cache = Some(cache);
    }

    pub fn detach_cache(&mut self) -> Option<Box<dyn CacheStore>> {
        self.cache.take()
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// Token list of an artifact, restored from the cache store if attached
    pub fn tokens(&self, id: ArtifactId) -> Result<Vec<Token>, ModelError> {
        let artifact = self.artifact(id)?;
        if let Some(cache) = &self.cache {
            trace!(%id, scope = cache.scope(), "restoring tokens");
            if let Some(tokens) = cache.restore_tokens(id)? {
                return Ok(tokens);
            }
        }
        Ok(artifact.tokens.clone())
    }

    /// Set the token list and derive the artifact's line range from it
    pub fn set_tokens(&mut self, id: ArtifactId, tokens: Vec<Token>) -> Result<(), ModelError> {
        let artifact = self
            .artifacts
            .get_mut(id.index())
            .ok_or(ModelError::UnknownArtifact(id))?;
        artifact.set_lines(line_bounds(&tokens));

        match self.cache.as_mut() {
            Some(cache) => {
                trace!(%id, scope = cache.scope(), count = tokens.len(), "storing tokens");
                cache.store_tokens(id, &tokens)?;
                artifact.tokens.clear();
                artifact.cached = true;
            }
            None => artifact.tokens = tokens,
        }
        Ok(())
    }
}
