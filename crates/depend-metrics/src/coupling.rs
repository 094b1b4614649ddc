//! Coupling analyzer
//!
//! Collects afferent (Ca) and efferent (Ce) coupling per type, project
//! fanout and the number of distinct calls per routine. Edges between a
//! type and its own super- or subtypes are not coupling.

use crate::{Analyzer, AnalyzerState, MetricValue, Metrics, MetricsError, ProcessListener};
use depend_ast::visit::{walk_namespaces, walk_type};
use depend_ast::{ArtifactId, Node, RoutineData, Scope, TypeRef, Visitor};
use depend_hierarchy::Hierarchy;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

pub const METRIC_CA: &str = "ca";
pub const METRIC_CBO: &str = "cbo";
pub const METRIC_CE: &str = "ce";
pub const METRIC_CALLS: &str = "calls";
pub const METRIC_FANOUT: &str = "fanout";

/// Dependents and dependencies of one type
#[derive(Debug, Default, Clone)]
struct Dependencies {
    /// Types and functions depending on this type
    ca: BTreeSet<ArtifactId>,
    /// Types this type depends on
    ce: BTreeSet<ArtifactId>,
}

/// Coupling metrics of one type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCoupling {
    pub ca: u64,
    pub cbo: u64,
    pub ce: u64,
}

#[derive(Debug, Default)]
struct CouplingState {
    dependencies: BTreeMap<ArtifactId, Dependencies>,
    calls: u64,
    fanout: u64,
}

/// Afferent/efferent coupling, fanout and call counting
#[derive(Debug, Default)]
pub struct CouplingAnalyzer {
    state: AnalyzerState,
    nodes: BTreeMap<ArtifactId, NodeCoupling>,
    calls: u64,
    fanout: u64,
}

impl CouplingAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct call signatures across all analyzed routines
    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub fn fanout(&self) -> u64 {
        self.fanout
    }

    /// Coupling of a type, `None` if it never took part in the analysis
    pub fn coupling(&self, id: ArtifactId) -> Option<NodeCoupling> {
        self.nodes.get(&id).copied()
    }

    fn finalize(&mut self, state: CouplingState) {
        self.fanout = state.fanout;
        self.calls = state.calls;
        for (id, deps) in state.dependencies {
            self.fanout += deps.ce.len() as u64;
            self.nodes.insert(
                id,
                NodeCoupling {
                    ca: deps.ca.len() as u64,
                    cbo: deps.ce.len() as u64,
                    ce: deps.ce.len() as u64,
                },
            );
        }
        self.state = AnalyzerState::Finalized;
    }
}

impl Analyzer for CouplingAnalyzer {
    fn name(&self) -> &'static str {
        "coupling"
    }

    fn state(&self) -> AnalyzerState {
        self.state
    }

    fn analyze(
        &mut self,
        scope: Scope<'_>,
        namespaces: &[ArtifactId],
        listener: &mut dyn ProcessListener,
    ) -> Result<(), MetricsError> {
        if self.state == AnalyzerState::Finalized {
            return Ok(());
        }
        self.reset();
        self.state = AnalyzerState::Running;
        debug!(namespaces = namespaces.len(), "coupling analysis started");

        let mut collector = Collector {
            hierarchy: Hierarchy::new(scope),
            state: CouplingState::default(),
            listener,
        };
        if let Err(err) = walk_namespaces(&mut collector, scope, namespaces) {
            self.reset();
            return Err(err);
        }

        let state = collector.state;
        self.finalize(state);
        debug!(
            types = self.nodes.len(),
            calls = self.calls,
            fanout = self.fanout,
            "coupling analysis finished"
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.state = AnalyzerState::Uninitialized;
        self.nodes.clear();
        self.calls = 0;
        self.fanout = 0;
    }

    fn node_metrics(&self, id: ArtifactId) -> Metrics {
        let mut metrics = Metrics::new();
        if let Some(node) = self.nodes.get(&id) {
            metrics.insert(METRIC_CA.to_string(), MetricValue::Int(node.ca));
            metrics.insert(METRIC_CBO.to_string(), MetricValue::Int(node.cbo));
            metrics.insert(METRIC_CE.to_string(), MetricValue::Int(node.ce));
        }
        metrics
    }

    fn project_metrics(&self) -> Metrics {
        let mut metrics = Metrics::new();
        metrics.insert(METRIC_CALLS.to_string(), MetricValue::Int(self.calls));
        metrics.insert(METRIC_FANOUT.to_string(), MetricValue::Int(self.fanout));
        metrics
    }

    fn measured(&self) -> Vec<ArtifactId> {
        self.nodes.keys().copied().collect()
    }
}

/// The traversal half of the analyzer; its state is only kept on success
struct Collector<'a, 'l> {
    hierarchy: Hierarchy<'a>,
    state: CouplingState,
    listener: &'l mut dyn ProcessListener,
}

impl<'a, 'l> Collector<'a, 'l> {
    fn init_type(&mut self, id: ArtifactId) {
        self.state.dependencies.entry(id).or_default();
    }

    fn resolve(&self, type_ref: &TypeRef) -> Option<ArtifactId> {
        self.hierarchy
            .resolve(type_ref)
            .filter(|&id| self.hierarchy.model().get(id).is_some_and(|a| a.kind().is_type()))
    }

    /// Declared return type, thrown types and other referenced types
    fn routine_types(&self, routine: &RoutineData) -> Result<Vec<ArtifactId>, MetricsError> {
        let referenced = routine.referenced_types(self.hierarchy.scope().max_nesting)?;
        Ok(routine
            .return_type
            .iter()
            .chain(routine.thrown.iter())
            .chain(referenced)
            .filter_map(|r| self.resolve(r))
            .collect())
    }

    fn count_calls(&mut self, routine: &RoutineData) -> Result<(), MetricsError> {
        let signatures = routine.call_signatures(self.hierarchy.scope().max_nesting)?;
        let distinct: HashSet<String> = signatures.into_iter().collect();
        self.state.calls += distinct.len() as u64;
        Ok(())
    }

    fn couple(&mut self, declaring: ArtifactId, coupled: ArtifactId) {
        self.init_type(declaring);
        if declaring == coupled {
            return;
        }
        let related = self
            .hierarchy
            .is_subtype_of(coupled, declaring)
            .and_then(|down| match down {
                true => Ok(true),
                false => self.hierarchy.is_subtype_of(declaring, coupled),
            });
        match related {
            Ok(true) => return,
            Ok(false) => {}
            Err(err) => {
                warn!(
                    declaring = %self.hierarchy.model().qualified_name(declaring),
                    coupled = %self.hierarchy.model().qualified_name(coupled),
                    error = %err,
                    "skipping coupling edge"
                );
                return;
            }
        }

        self.init_type(coupled);
        if let Some(deps) = self.state.dependencies.get_mut(&declaring) {
            deps.ce.insert(coupled);
        }
        if let Some(deps) = self.state.dependencies.get_mut(&coupled) {
            deps.ca.insert(declaring);
        }
    }

    fn visit_type(&mut self, scope: Scope<'a>, id: ArtifactId) -> Result<(), MetricsError> {
        self.init_type(id);
        walk_type(self, scope, id)
    }
}

impl<'a, 'l> Visitor<'a> for Collector<'a, 'l> {
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

    fn visit_function(&mut self, scope: Scope<'a>, id: ArtifactId) -> Result<(), MetricsError> {
        let routine = scope.model.routine(id)?;
        let types: BTreeSet<ArtifactId> = self.routine_types(routine)?.into_iter().collect();
        self.state.fanout += types.len() as u64;
        for ty in types {
            self.init_type(ty);
            if let Some(deps) = self.state.dependencies.get_mut(&ty) {
                deps.ca.insert(id);
            }
        }
        self.count_calls(routine)
    }

    fn visit_method(&mut self, scope: Scope<'a>, id: ArtifactId) -> Result<(), MetricsError> {
        let routine = scope.model.routine(id)?;
        if let Some(declaring) = routine.parent {
            for coupled in self.routine_types(routine)? {
                self.couple(declaring, coupled);
            }
        }
        self.count_calls(routine)
    }

    fn visit_property(&mut self, scope: Scope<'a>, id: ArtifactId) -> Result<(), MetricsError> {
        let property = scope.model.property(id)?;
        let Some(declaring) = property.parent else {
            return Ok(());
        };
        self.init_type(declaring);
        if let Some(coupled) = property.type_ref.as_ref().and_then(|r| self.resolve(r)) {
            self.couple(declaring, coupled);
        }
        Ok(())
    }
}
