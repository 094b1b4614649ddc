//! Trait method composition
//!
//! [`compose`] is a pure function from the method sources of a type to its
//! resolved method table. Names are compared case-insensitively. Resolution
//! order:
//! 1. Methods declared on the type itself always win.
//! 2. Trait methods, after precedence (`T1::m insteadof T2`) and alias
//!    (`T::m as [visibility] [name]`) rules, claim the remaining names. Two
//!    distinct concrete trait methods left on one name are a collision;
//!    an abstract trait method yields to a concrete one.
//! 3. Inherited methods fill names still unclaimed, and replace an abstract
//!    trait method.
//! 4. Interface methods fill whatever is left.

use crate::{Hierarchy, HierarchyError};
use depend_ast::{ArtifactId, ArtifactKind, Modifiers};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// A resolved method of a type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodEntry {
    /// Name under which the method is visible, the alias for aliased methods
    pub name: String,
    /// The declared method artifact
    pub method: ArtifactId,
    /// The type itself, the contributing trait, ancestor or interface
    pub origin: ArtifactId,
    /// Modifiers after visibility adaptations
    pub modifiers: Modifiers,
}

impl MethodEntry {
    pub fn is_abstract(&self) -> bool {
        self.modifiers.is_abstract()
    }
}

fn method_key(name: &str) -> String {
    name.to_lowercase()
}

/// Name-keyed method mapping in resolution order
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    entries: Vec<MethodEntry>,
    index: HashMap<String, usize>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&MethodEntry> {
        self.index.get(&method_key(name)).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&method_key(name))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MethodEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Insert unless the name is already claimed
    pub fn insert(&mut self, entry: MethodEntry) -> bool {
        let key = method_key(&entry.name);
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(entry);
        true
    }

    /// Replace the entry of the same name in place, or append
    pub fn replace(&mut self, entry: MethodEntry) {
        match self.index.get(&method_key(&entry.name)) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.insert(entry);
            }
        }
    }

    pub fn into_entries(self) -> Vec<MethodEntry> {
        self.entries
    }
}

impl<'t> IntoIterator for &'t MethodTable {
    type Item = &'t MethodEntry;
    type IntoIter = std::slice::Iter<'t, MethodEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A method as contributed by a source
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSource {
    pub method: ArtifactId,
    pub name: String,
    pub modifiers: Modifiers,
}

/// Methods of one used trait, already composed for the trait itself
#[derive(Debug, Clone)]
pub struct TraitMethods {
    pub trait_id: ArtifactId,
    pub methods: Vec<MethodSource>,
}

/// `winner::method insteadof losers`
#[derive(Debug, Clone)]
pub struct ResolvedPrecedence {
    pub winner: ArtifactId,
    pub method: String,
    pub losers: Vec<ArtifactId>,
}

/// `[trait_id::]method as [visibility] [alias]`
#[derive(Debug, Clone)]
pub struct ResolvedAlias {
    pub trait_id: Option<ArtifactId>,
    pub method: String,
    pub alias: Option<String>,
    pub visibility: Option<Modifiers>,
}

impl ResolvedAlias {
    fn applies_to(&self, trait_id: ArtifactId, method: &str) -> bool {
        self.trait_id.map_or(true, |t| t == trait_id) && self.method.eq_ignore_ascii_case(method)
    }
}

/// Everything [`compose`] needs to know about a type
#[derive(Debug, Clone)]
pub struct Composition {
    pub type_id: ArtifactId,
    pub type_name: String,
    pub own: Vec<MethodSource>,
    pub traits: Vec<TraitMethods>,
    pub precedences: Vec<ResolvedPrecedence>,
    pub aliases: Vec<ResolvedAlias>,
    /// Resolved methods of the parent type
    pub inherited: Vec<MethodEntry>,
    /// Declared methods of all interfaces, in interface order
    pub interfaces: Vec<MethodEntry>,
}

/// Trait candidates grouped by name, in first-seen order
#[derive(Default)]
struct Candidates {
    groups: Vec<Vec<MethodEntry>>,
    index: HashMap<String, usize>,
}

impl Candidates {
    fn push(&mut self, entry: MethodEntry) {
        let key = method_key(&entry.name);
        match self.index.get(&key) {
            Some(&i) => self.groups[i].push(entry),
            None => {
                self.index.insert(key, self.groups.len());
                self.groups.push(vec![entry]);
            }
        }
    }
}

fn trait_candidates(
    traits: &[TraitMethods],
    precedences: &[ResolvedPrecedence],
    aliases: &[ResolvedAlias],
) -> Candidates {
    let mut candidates = Candidates::default();
    for used in traits {
        for source in &used.methods {
            let rules: Vec<&ResolvedAlias> = aliases
                .iter()
                .filter(|a| a.applies_to(used.trait_id, &source.name))
                .collect();

            let excluded = precedences.iter().any(|p| {
                p.method.eq_ignore_ascii_case(&source.name)
                    && p.winner != used.trait_id
                    && p.losers.contains(&used.trait_id)
            });
            if !excluded {
                let mut modifiers = source.modifiers;
                for rule in rules.iter().filter(|r| r.alias.is_none()) {
                    if let Some(visibility) = rule.visibility {
                        modifiers = modifiers.with_visibility(visibility);
                    }
                }
                candidates.push(MethodEntry {
                    name: source.name.clone(),
                    method: source.method,
                    origin: used.trait_id,
                    modifiers,
                });
            }

            // Aliases bind regardless of precedence
            for rule in &rules {
                if let Some(alias) = &rule.alias {
                    candidates.push(MethodEntry {
                        name: alias.clone(),
                        method: source.method,
                        origin: used.trait_id,
                        modifiers: rule
                            .visibility
                            .map_or(source.modifiers, |v| source.modifiers.with_visibility(v)),
                    });
                }
            }
        }
    }
    candidates
}

fn resolve_group(group: Vec<MethodEntry>, type_name: &str) -> Result<Option<MethodEntry>, HierarchyError> {
    let mut distinct: Vec<MethodEntry> = Vec::new();
    for entry in group {
        if !distinct.iter().any(|d| d.method == entry.method) {
            distinct.push(entry);
        }
    }

    let concrete: Vec<&MethodEntry> = distinct.iter().filter(|e| !e.is_abstract()).collect();
    if concrete.len() > 1 {
        debug!(
            method = %concrete[0].name,
            type_name,
            candidates = concrete.len(),
            "trait method collision"
        );
        return Err(HierarchyError::MethodCollision {
            method: concrete[0].name.clone(),
            type_name: type_name.to_string(),
        });
    }
    Ok(concrete
        .first()
        .map(|e| (*e).clone())
        .or_else(|| distinct.into_iter().next()))
}

/// Resolve the method table of a type from its method sources
pub fn compose(input: Composition) -> Result<MethodTable, HierarchyError> {
    let Composition {
        type_id,
        type_name,
        own,
        traits,
        precedences,
        aliases,
        inherited,
        interfaces,
    } = input;

    let mut table = MethodTable::new();
    for source in own {
        table.insert(MethodEntry {
            name: source.name,
            method: source.method,
            origin: type_id,
            modifiers: source.modifiers,
        });
    }

    let candidates = trait_candidates(&traits, &precedences, &aliases);
    for group in candidates.groups {
        if group.first().is_some_and(|e| table.contains(&e.name)) {
            continue;
        }
        if let Some(winner) = resolve_group(group, &type_name)? {
            table.insert(winner);
        }
    }

    for entry in inherited {
        let replaces_abstract_trait_method = table
            .get(&entry.name)
            .is_some_and(|e| e.origin != type_id && e.is_abstract() && !entry.is_abstract());
        if replaces_abstract_trait_method {
            table.replace(entry);
        } else {
            table.insert(entry);
        }
    }

    for entry in interfaces {
        table.insert(entry);
    }
    Ok(table)
}

impl<'a> Hierarchy<'a> {
    /// All methods visible on a type, keyed by lower-cased name
    pub fn all_methods(&self, id: ArtifactId) -> Result<MethodTable, HierarchyError> {
        self.methods_of(id, &mut Vec::new())
    }

    fn declared_methods(&self, id: ArtifactId) -> Result<Vec<MethodSource>, HierarchyError> {
        let model = self.model();
        let mut methods = Vec::new();
        for &member in &model.type_data(id)?.members {
            let artifact = model.artifact(member)?;
            if artifact.kind() == ArtifactKind::Method && self.scope().accepts(member) {
                methods.push(MethodSource {
                    method: member,
                    name: artifact.name.clone(),
                    modifiers: artifact.modifiers(),
                });
            }
        }
        Ok(methods)
    }

    fn methods_of(
        &self,
        id: ArtifactId,
        stack: &mut Vec<ArtifactId>,
    ) -> Result<MethodTable, HierarchyError> {
        if stack.contains(&id) {
            let root = stack.first().copied().unwrap_or(id);
            return Err(self.recursion_error(root, stack, id));
        }
        stack.push(id);
        let result = self.collect_composition(id, stack).and_then(compose);
        stack.pop();
        result
    }

    fn collect_composition(
        &self,
        id: ArtifactId,
        stack: &mut Vec<ArtifactId>,
    ) -> Result<Composition, HierarchyError> {
        let model = self.model();
        let data = model.type_data(id)?;

        let mut traits = Vec::new();
        let mut precedences = Vec::new();
        let mut aliases = Vec::new();
        for trait_use in &data.trait_uses {
            for type_ref in &trait_use.traits {
                let Some(trait_id) = self.resolve_kind(type_ref, ArtifactKind::Trait) else {
                    continue;
                };
                let methods = self
                    .methods_of(trait_id, stack)?
                    .into_entries()
                    .into_iter()
                    .map(|e| MethodSource {
                        method: e.method,
                        name: e.name,
                        modifiers: e.modifiers,
                    })
                    .collect();
                traits.push(TraitMethods { trait_id, methods });
            }

            for precedence in &trait_use.precedences {
                let Some(winner) = self.resolve(&precedence.trait_ref) else {
                    continue;
                };
                precedences.push(ResolvedPrecedence {
                    winner,
                    method: precedence.method.clone(),
                    losers: precedence
                        .instead_of
                        .iter()
                        .filter_map(|r| self.resolve(r))
                        .collect(),
                });
            }

            for alias in &trait_use.aliases {
                let trait_id = match &alias.trait_ref {
                    Some(type_ref) => match self.resolve(type_ref) {
                        Some(t) => Some(t),
                        None => continue,
                    },
                    None => None,
                };
                aliases.push(ResolvedAlias {
                    trait_id,
                    method: alias.method.clone(),
                    alias: alias.alias.clone(),
                    visibility: alias.visibility,
                });
            }
        }

        let inherited = match self.parent(id)? {
            Some(parent) => self.methods_of(parent, stack)?.into_entries(),
            None => Vec::new(),
        };

        let mut interfaces = Vec::new();
        for interface in self.all_interfaces(id)? {
            for source in self.declared_methods(interface)? {
                interfaces.push(MethodEntry {
                    name: source.name,
                    method: source.method,
                    origin: interface,
                    modifiers: source.modifiers,
                });
            }
        }

        Ok(Composition {
            type_id: id,
            type_name: model.qualified_name(id),
            own: self.declared_methods(id)?,
            traits,
            precedences,
            aliases,
            inherited,
            interfaces,
        })
    }
}
