//! Edge collection strategies
//!
//! A strategy is a visitor that records dependency edges into a shared
//! [`NodeTable`]. Each strategy runs once per [`Granularity`]: type edges
//! connect classes, interfaces and traits; namespace edges connect the
//! namespaces of those types.

use crate::{MetricsError, ProcessListener};
use depend_ast::visit::walk_type;
use depend_ast::{ArtifactId, ArtifactKind, Node, Scope, TypeRef, Visitor};
use depend_hierarchy::Hierarchy;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One node of the dependency graph
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub name: String,
    pub kind: ArtifactKind,
    /// Sources of edges ending here, one entry per edge
    pub incoming: Vec<ArtifactId>,
    /// Targets of edges starting here, one entry per edge
    pub outgoing: Vec<ArtifactId>,
}

/// Dependency graph keyed by artifact id
///
/// Edges point from the dependent artifact to its dependency. Parallel
/// edges are kept; self edges are never recorded.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: BTreeMap<ArtifactId, GraphNode>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ArtifactId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArtifactId, &GraphNode)> {
        self.nodes.iter().map(|(&id, node)| (id, node))
    }

    /// Add a node unless present
    pub fn init_node(&mut self, id: ArtifactId, name: impl Into<String>, kind: ArtifactKind) {
        self.nodes.entry(id).or_insert_with(|| GraphNode {
            name: name.into(),
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        });
    }

    /// Record `source -> target`; both nodes must exist
    pub fn add_edge(&mut self, source: ArtifactId, target: ArtifactId) {
        if source == target || !self.nodes.contains_key(&target) {
            return;
        }
        let Some(node) = self.nodes.get_mut(&source) else {
            return;
        };
        node.outgoing.push(target);
        if let Some(node) = self.nodes.get_mut(&target) {
            node.incoming.push(source);
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// Which declarations produce edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeStrategy {
    /// Parent class and implemented or extended interfaces
    Inheritance,
    /// Declared property types
    Property,
    /// Parameter, return, thrown and other referenced types of methods
    Method,
}

impl EdgeStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeStrategy::Inheritance => "inheritance",
            EdgeStrategy::Property => "property",
            EdgeStrategy::Method => "method",
        }
    }
}

impl fmt::Display for EdgeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeStrategy {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inheritance" => Ok(EdgeStrategy::Inheritance),
            "property" => Ok(EdgeStrategy::Property),
            "method" => Ok(EdgeStrategy::Method),
            _ => Err(MetricsError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Level at which a strategy records edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Type,
    Namespace,
}

/// Visitor running one strategy at one granularity
pub(crate) struct EdgeCollector<'a, 't, 'l> {
    strategy: EdgeStrategy,
    granularity: Granularity,
    hierarchy: Hierarchy<'a>,
    table: &'t mut NodeTable,
    listener: &'l mut dyn ProcessListener,
}

impl<'a, 't, 'l> EdgeCollector<'a, 't, 'l> {
    pub(crate) fn new(
        strategy: EdgeStrategy,
        granularity: Granularity,
        scope: Scope<'a>,
        table: &'t mut NodeTable,
        listener: &'l mut dyn ProcessListener,
    ) -> Self {
        Self {
            strategy,
            granularity,
            hierarchy: Hierarchy::new(scope),
            table,
            listener,
        }
    }

    /// Node standing for a type at this granularity
    fn node_for(&mut self, ty: ArtifactId) -> Option<ArtifactId> {
        let model = self.hierarchy.model();
        let id = match self.granularity {
            Granularity::Type => ty,
            Granularity::Namespace => model.namespace_of(ty)?,
        };
        let artifact = model.get(id)?;
        let name = match self.granularity {
            Granularity::Type => model.qualified_name(id),
            Granularity::Namespace => artifact.name.clone(),
        };
        self.table.init_node(id, name, artifact.kind());
        Some(id)
    }

    fn resolve_type(&self, type_ref: &TypeRef) -> Option<ArtifactId> {
        self.hierarchy
            .resolve(type_ref)
            .filter(|&id| self.hierarchy.model().get(id).is_some_and(|a| a.kind().is_type()))
    }

    /// Record that `dependent` depends on `dependency`
    fn process(&mut self, dependent: ArtifactId, dependency: ArtifactId) {
        let (Some(source), Some(target)) = (self.node_for(dependent), self.node_for(dependency))
        else {
            return;
        };
        self.table.add_edge(source, target);
    }

    fn process_refs<'r>(&mut self, dependent: ArtifactId, refs: impl IntoIterator<Item = &'r TypeRef>) {
        let targets: Vec<ArtifactId> = refs
            .into_iter()
            .filter_map(|r| self.resolve_type(r))
            .collect();
        for target in targets {
            self.process(dependent, target);
        }
    }

    fn visit_type(&mut self, scope: Scope<'a>, id: ArtifactId) -> Result<(), MetricsError> {
        self.node_for(id);
        if self.strategy == EdgeStrategy::Inheritance {
            for dependency in self.hierarchy.dependencies(id)? {
                if self.hierarchy.model().get(dependency).is_some_and(|a| a.kind().is_type()) {
                    self.process(id, dependency);
                }
            }
            return Ok(());
        }
        walk_type(self, scope, id)
    }
}

impl<'a, 't, 'l> Visitor<'a> for EdgeCollector<'a, 't, 'l> {
    type Error = MetricsError;

    fn start_visit(&mut self, scope: Scope<'a>, node: Node<'a>) {
        self.listener.start_visit(scope.model, node);
    }

    fn end_visit(&mut self, scope: Scope<'a>, node: Node<'a>) {
        self.listener.end_visit(scope.model, node);
    }

    fn visit_class(&mut self, scope: Scope<'a>, id: ArtifactId) -> Result<(), MetricsError> {
        self.visit_type(scope, id)
    }

    fn visit_interface(&mut self, scope: Scope<'a>, id: ArtifactId) -> Result<(), MetricsError> {
        self.visit_type(scope, id)
    }

    fn visit_trait(&mut self, scope: Scope<'a>, id: ArtifactId) -> Result<(), MetricsError> {
        self.visit_type(scope, id)
    }

    fn visit_function(&mut self, _scope: Scope<'a>, _id: ArtifactId) -> Result<(), MetricsError> {
        Ok(())
    }

    fn visit_method(&mut self, scope: Scope<'a>, id: ArtifactId) -> Result<(), MetricsError> {
        if self.strategy != EdgeStrategy::Method {
            return Ok(());
        }
        let routine = scope.model.routine(id)?;
        let Some(declaring) = routine.parent else {
            return Ok(());
        };
        let referenced = routine.referenced_types(scope.max_nesting)?;
        let refs = routine
            .return_type
            .iter()
            .chain(routine.thrown.iter())
            .chain(referenced);
        self.process_refs(declaring, refs);
        Ok(())
    }

    fn visit_property(&mut self, scope: Scope<'a>, id: ArtifactId) -> Result<(), MetricsError> {
        if self.strategy != EdgeStrategy::Property {
            return Ok(());
        }
        let property = scope.model.property(id)?;
        if let Some(declaring) = property.parent {
            self.process_refs(declaring, property.type_ref.iter());
        }
        Ok(())
    }
}
