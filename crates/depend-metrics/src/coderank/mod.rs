//! CodeRank analyzer
//!
//! Builds a dependency graph with the configured edge strategies, at type
//! and namespace granularity, then ranks it by power iteration. Reports
//! `cr` (rank flowing to dependencies), `rcr` (rank flowing to dependents)
//! and the raw edge counts per node: `in` for the edges to its
//! dependencies, `out` for the edges from its dependents.

mod rank;
mod strategy;

pub use rank::{relax, Flow, Relaxation};
pub use strategy::{EdgeStrategy, GraphNode, Granularity, NodeTable};

use crate::{Analyzer, AnalyzerState, MetricValue, Metrics, MetricsError, ProcessListener};
use depend_ast::visit::walk_namespaces;
use depend_ast::{ArtifactId, Scope};
use serde::Deserialize;
use std::collections::BTreeMap;
use strategy::EdgeCollector;
use tracing::debug;

pub const METRIC_CR: &str = "cr";
pub const METRIC_RCR: &str = "rcr";
pub const METRIC_IN: &str = "in";
pub const METRIC_OUT: &str = "out";

/// `[coderank]` section of the configuration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeRankSettings {
    pub damping: f64,
    pub iterations: usize,
    pub convergence: f64,
    pub strategies: Vec<String>,
}

impl Default for CodeRankSettings {
    fn default() -> Self {
        Self {
            damping: 0.85,
            iterations: 25,
            convergence: 1e-9,
            strategies: vec!["inheritance".to_string()],
        }
    }
}

/// Ranks of one node
///
/// Reported as `in` (edges to the node's dependencies) and `out` (edges
/// from its dependents), counting parallel edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRank {
    pub cr: f64,
    pub rcr: f64,
    pub dependencies: usize,
    pub dependents: usize,
}

/// PageRank-style importance of types and namespaces
#[derive(Debug)]
pub struct CodeRankAnalyzer {
    state: AnalyzerState,
    strategies: Vec<EdgeStrategy>,
    relaxation: Relaxation,
    table: NodeTable,
    ranks: BTreeMap<ArtifactId, NodeRank>,
}

impl CodeRankAnalyzer {
    /// Validate settings and build the analyzer
    pub fn new(settings: &CodeRankSettings) -> Result<Self, MetricsError> {
        if !(settings.damping > 0.0 && settings.damping < 1.0) {
            return Err(MetricsError::InvalidSetting {
                name: "damping",
                reason: format!("{} is not between 0 and 1", settings.damping),
            });
        }
        let mut strategies = Vec::new();
        for name in &settings.strategies {
            let strategy: EdgeStrategy = name.parse()?;
            if !strategies.contains(&strategy) {
                strategies.push(strategy);
            }
        }
        Ok(Self {
            state: AnalyzerState::Uninitialized,
            strategies,
            relaxation: Relaxation {
                damping: settings.damping,
                iterations: settings.iterations,
                convergence: settings.convergence,
            },
            table: NodeTable::new(),
            ranks: BTreeMap::new(),
        })
    }

    pub fn strategies(&self) -> &[EdgeStrategy] {
        &self.strategies
    }

    /// The frozen graph of the last run
    pub fn graph(&self) -> &NodeTable {
        &self.table
    }

    pub fn rank(&self, id: ArtifactId) -> Option<NodeRank> {
        self.ranks.get(&id).copied()
    }

    fn collect(
        &self,
        scope: Scope<'_>,
        namespaces: &[ArtifactId],
        listener: &mut dyn ProcessListener,
    ) -> Result<NodeTable, MetricsError> {
        let mut table = NodeTable::new();
        for &strategy in &self.strategies {
            for granularity in [Granularity::Type, Granularity::Namespace] {
                let mut collector =
                    EdgeCollector::new(strategy, granularity, scope, &mut table, &mut *listener);
                walk_namespaces(&mut collector, scope, namespaces)?;
            }
        }
        Ok(table)
    }
}

impl Default for CodeRankAnalyzer {
    fn default() -> Self {
        Self {
            state: AnalyzerState::Uninitialized,
            strategies: vec![EdgeStrategy::Inheritance],
            relaxation: Relaxation {
                damping: 0.85,
                iterations: 25,
                convergence: 1e-9,
            },
            table: NodeTable::new(),
            ranks: BTreeMap::new(),
        }
    }
}

impl Analyzer for CodeRankAnalyzer {
    fn name(&self) -> &'static str {
        "coderank"
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
        debug!(strategies = ?self.strategies, "coderank analysis started");

        let table = match self.collect(scope, namespaces, listener) {
            Ok(table) => table,
            Err(err) => {
                self.reset();
                return Err(err);
            }
        };

        let cr = relax(&table, Flow::Forward, self.relaxation);
        let rcr = relax(&table, Flow::Reverse, self.relaxation);
        for (id, node) in table.iter() {
            self.ranks.insert(
                id,
                NodeRank {
                    cr: cr.get(&id).copied().unwrap_or(0.0),
                    rcr: rcr.get(&id).copied().unwrap_or(0.0),
                    dependencies: node.outgoing.len(),
                    dependents: node.incoming.len(),
                },
            );
        }
        self.table = table;
        self.state = AnalyzerState::Finalized;
        debug!(nodes = self.ranks.len(), "coderank analysis finished");
        Ok(())
    }

    fn reset(&mut self) {
        self.state = AnalyzerState::Uninitialized;
        self.table.clear();
        self.ranks.clear();
    }

    fn node_metrics(&self, id: ArtifactId) -> Metrics {
        let mut metrics = Metrics::new();
        if let Some(rank) = self.ranks.get(&id) {
            metrics.insert(METRIC_CR.to_string(), MetricValue::Float(rank.cr));
            metrics.insert(METRIC_RCR.to_string(), MetricValue::Float(rank.rcr));
            metrics.insert(METRIC_IN.to_string(), MetricValue::Int(rank.dependencies as u64));
            metrics.insert(METRIC_OUT.to_string(), MetricValue::Int(rank.dependents as u64));
        }
        metrics
    }

    fn measured(&self) -> Vec<ArtifactId> {
        self.ranks.keys().copied().collect()
    }
}
