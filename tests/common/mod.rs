//! Shared model fixtures for the integration tests

#![allow(dead_code)]

use depend::ast::{ArtifactId, CodeModel, Modifiers, TraitUse, TypeRef};

/// Builder shortcuts over a single-namespace model
pub struct Fixture {
    pub model: CodeModel,
    pub ns: ArtifactId,
}

impl Fixture {
    pub fn new(namespace: &str) -> Self {
        let mut model = CodeModel::new();
        let ns = model.add_namespace(namespace);
        Self { model, ns }
    }

    pub fn class(&mut self, name: &str) -> ArtifactId {
        self.model.add_class(self.ns, name).unwrap()
    }

    pub fn interface(&mut self, name: &str) -> ArtifactId {
        self.model.add_interface(self.ns, name).unwrap()
    }

    pub fn trait_(&mut self, name: &str) -> ArtifactId {
        self.model.add_trait(self.ns, name).unwrap()
    }

    pub fn method(&mut self, owner: ArtifactId, name: &str) -> ArtifactId {
        let method = self.model.add_method(owner, name).unwrap();
        self.model.set_modifiers(method, Modifiers::PUBLIC).unwrap();
        method
    }

    pub fn extends(&mut self, child: ArtifactId, parent: &str) {
        self.model.type_data_mut(child).unwrap().parent = Some(TypeRef::new(parent));
    }

    pub fn implements(&mut self, ty: ArtifactId, interface: &str) {
        self.model
            .type_data_mut(ty)
            .unwrap()
            .interfaces
            .push(TypeRef::new(interface));
    }

    pub fn uses(&mut self, ty: ArtifactId, trait_use: TraitUse) {
        self.model.type_data_mut(ty).unwrap().trait_uses.push(trait_use);
    }
}
