//! Artifact node types

use crate::{ArtifactId, Expr, ModelError, Modifiers, Token, TraversalError, UnitId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    Namespace,
    Class,
    Interface,
    Trait,
    Method,
    Function,
    Property,
}

impl ArtifactKind {
    /// Classes, interfaces and traits
    pub fn is_type(self) -> bool {
        matches!(self, ArtifactKind::Class | ArtifactKind::Interface | ArtifactKind::Trait)
    }

    /// Methods and functions
    pub fn is_routine(self) -> bool {
        matches!(self, ArtifactKind::Method | ArtifactKind::Function)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Namespace => "namespace",
            ArtifactKind::Class => "class",
            ArtifactKind::Interface => "interface",
            ArtifactKind::Trait => "trait",
            ArtifactKind::Method => "method",
            ArtifactKind::Function => "function",
            ArtifactKind::Property => "property",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to a type by its qualified name: `app\User`
///
/// Resolved lazily through the model registry, so a type may be referenced
/// before the builder has created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Value of a declared constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstantValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// A constant declared on a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub value: ConstantValue,
}

impl Constant {
    pub fn new(name: impl Into<String>, value: ConstantValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A `use T1, T2 { ... }` statement inside a type body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitUse {
    pub traits: Vec<TypeRef>,
    pub precedences: Vec<TraitPrecedence>,
    pub aliases: Vec<TraitAlias>,
}

impl TraitUse {
    pub fn new(traits: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            traits: traits.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// `T1::method insteadof T2, T3`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitPrecedence {
    pub trait_ref: TypeRef,
    pub method: String,
    pub instead_of: Vec<TypeRef>,
}

/// `[T::]method as [visibility] [alias]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitAlias {
    /// Trait the method is taken from; any used trait when absent
    pub trait_ref: Option<TypeRef>,
    pub method: String,
    pub alias: Option<String>,
    /// Only the visibility bits are applied
    pub visibility: Option<Modifiers>,
}

/// A formal parameter of a routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_ref: Option<TypeRef>,
}

/// Namespace payload: the types and functions registered in it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceData {
    pub types: Vec<ArtifactId>,
    pub functions: Vec<ArtifactId>,
}

/// Class, interface and trait payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeData {
    /// Owning namespace
    pub namespace: Option<ArtifactId>,
    pub namespace_name: String,
    /// `extends` of a class; interfaces keep their parents in `interfaces`
    pub parent: Option<TypeRef>,
    /// `implements` of a class, `extends` of an interface
    pub interfaces: Vec<TypeRef>,
    pub constants: Vec<Constant>,
    /// Methods and properties in declaration order
    pub members: Vec<ArtifactId>,
    pub trait_uses: Vec<TraitUse>,
    pub user_defined: bool,
}

impl TypeData {
    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|c| c.name == name)
    }
}

/// Method and function payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutineData {
    /// Declaring type of a method, namespace of a function
    pub parent: Option<ArtifactId>,
    pub return_type: Option<TypeRef>,
    pub thrown: Vec<TypeRef>,
    /// Dependencies the builder found outside the signature
    pub dependencies: Vec<TypeRef>,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Expr>,
}

impl RoutineData {
    /// Types referenced by parameters, declared dependencies and the body,
    /// excluding the return type and thrown types.
    ///
    /// Fails when a body expression is nested deeper than `max_nesting`.
    pub fn referenced_types(&self, max_nesting: usize) -> Result<Vec<&TypeRef>, TraversalError> {
        let mut refs: Vec<&TypeRef> = self
            .parameters
            .iter()
            .filter_map(|p| p.type_ref.as_ref())
            .collect();
        refs.extend(self.dependencies.iter());
        for expr in &self.body {
            expr.collect_type_references(max_nesting, &mut refs)?;
        }
        Ok(refs)
    }

    /// Canonical signatures of all invocations in the body, in source order
    pub fn call_signatures(&self, max_nesting: usize) -> Result<Vec<String>, TraversalError> {
        let mut signatures = Vec::new();
        for expr in &self.body {
            expr.collect_call_signatures(max_nesting, &mut signatures)?;
        }
        Ok(signatures)
    }
}

/// Property payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyData {
    /// Declaring type
    pub parent: Option<ArtifactId>,
    pub type_ref: Option<TypeRef>,
}

/// Kind specific payload of an artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArtifactData {
    Namespace(NamespaceData),
    Type(TypeData),
    Routine(RoutineData),
    Property(PropertyData),
}

impl ArtifactData {
    pub(crate) fn for_kind(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Namespace => ArtifactData::Namespace(NamespaceData::default()),
            ArtifactKind::Class | ArtifactKind::Interface | ArtifactKind::Trait => {
                ArtifactData::Type(TypeData::default())
            }
            ArtifactKind::Method | ArtifactKind::Function => {
                ArtifactData::Routine(RoutineData::default())
            }
            ArtifactKind::Property => ArtifactData::Property(PropertyData::default()),
        }
    }
}

/// A named code element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    id: ArtifactId,
    kind: ArtifactKind,
    pub name: String,
    pub doc_comment: Option<String>,
    unit: Option<UnitId>,
    modifiers: Option<Modifiers>,
    start_line: u32,
    end_line: u32,
    /// In-memory token list, used while no cache store is attached
    #[serde(skip)]
    pub(crate) tokens: Vec<Token>,
    /// Set once the token list was written to a cache store
    #[serde(skip)]
    pub(crate) cached: bool,
    pub data: ArtifactData,
}

impl Artifact {
    pub(crate) fn new(id: ArtifactId, kind: ArtifactKind, name: String) -> Self {
        Self {
            id,
            kind,
            name,
            doc_comment: None,
            unit: None,
            modifiers: None,
            start_line: 0,
            end_line: 0,
            tokens: Vec::new(),
            cached: false,
            data: ArtifactData::for_kind(kind),
        }
    }

    pub(crate) fn restored(
        id: ArtifactId,
        kind: ArtifactKind,
        name: String,
        modifiers: Option<Modifiers>,
        unit: Option<UnitId>,
        lines: (u32, u32),
        data: ArtifactData,
    ) -> Self {
        Self {
            id,
            kind,
            name,
            doc_comment: None,
            unit,
            modifiers,
            start_line: lines.0,
            end_line: lines.1,
            tokens: Vec::new(),
            cached: false,
            data,
        }
    }

    pub fn id(&self) -> ArtifactId {
        self.id
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Owning compilation unit
    pub fn unit(&self) -> Option<UnitId> {
        self.unit
    }

    pub(crate) fn assign_unit(&mut self, unit: UnitId) {
        self.unit = Some(unit);
    }

    /// Modifier bits, empty until assigned
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers.unwrap_or_default()
    }

    pub(crate) fn raw_modifiers(&self) -> Option<Modifiers> {
        self.modifiers
    }

    /// Assign the modifier set; allowed exactly once
    pub fn set_modifiers(&mut self, modifiers: Modifiers) -> Result<(), ModelError> {
        if self.modifiers.is_some() {
            return Err(ModelError::ModifiersAlreadySet {
                name: self.name.clone(),
            });
        }
        modifiers
            .validate()
            .map_err(|reason| ModelError::InvalidModifiers {
                name: self.name.clone(),
                reason,
            })?;
        self.modifiers = Some(modifiers);
        Ok(())
    }

    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    pub(crate) fn set_lines(&mut self, (start, end): (u32, u32)) {
        self.start_line = start;
        self.end_line = end;
    }

    /// Whether the token list currently lives in the cache store
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers().is_abstract()
    }

    pub fn is_final(&self) -> bool {
        self.modifiers().is_final()
    }

    pub fn as_namespace(&self) -> Option<&NamespaceData> {
        match &self.data {
            ArtifactData::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeData> {
        match &self.data {
            ArtifactData::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_routine(&self) -> Option<&RoutineData> {
        match &self.data {
            ArtifactData::Routine(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyData> {
        match &self.data {
            ArtifactData::Property(p) => Some(p),
            _ => None,
        }
    }

    /// Parent artifact: declaring type of a member, namespace of a type or
    /// function.
    pub fn parent(&self) -> Option<ArtifactId> {
        match &self.data {
            ArtifactData::Namespace(_) => None,
            ArtifactData::Type(t) => t.namespace,
            ArtifactData::Routine(r) => r.parent,
            ArtifactData::Property(p) => p.parent,
        }
    }
}
