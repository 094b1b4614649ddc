//! Analysis engine
//!
//! Runs a list of analyzers over one code model and gathers their results
//! into a serializable [`Report`].

use crate::{Analyzer, ListenerSet, Metrics, MetricsError, ProcessListener};
use depend_ast::{
    ArtifactFilter, ArtifactId, ArtifactKind, CodeModel, FilterChain, Scope, DEFAULT_NESTING_LIMIT,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Metrics of one artifact, merged across analyzers
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub id: ArtifactId,
    pub name: String,
    pub kind: ArtifactKind,
    pub metrics: Metrics,
}

/// Result of an engine run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Project metrics keyed by analyzer name
    pub project: BTreeMap<String, Metrics>,
    /// Measured artifacts in id order
    pub nodes: Vec<NodeReport>,
}

impl Report {
    pub fn node(&self, id: ArtifactId) -> Option<&NodeReport> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_named(&self, name: &str) -> Option<&NodeReport> {
        self.nodes.iter().find(|n| n.name.eq_ignore_ascii_case(name))
    }
}

/// Drives analyzers with a shared filter and listener set
pub struct Engine {
    analyzers: Vec<Box<dyn Analyzer>>,
    listeners: ListenerSet,
    filter: FilterChain,
    max_nesting: usize,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            analyzers: Vec::new(),
            listeners: ListenerSet::new(),
            filter: FilterChain::new(),
            max_nesting: DEFAULT_NESTING_LIMIT,
        }
    }

    pub fn add_analyzer(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    pub fn add_listener(&mut self, listener: Box<dyn ProcessListener>) {
        self.listeners.push(listener);
    }

    /// Registered listeners, for notifications outside an analysis run
    pub fn listeners(&mut self) -> &mut ListenerSet {
        &mut self.listeners
    }

    pub fn add_filter(&mut self, filter: impl ArtifactFilter + 'static) {
        self.filter.push(filter);
    }

    pub fn set_max_nesting(&mut self, max_nesting: usize) {
        self.max_nesting = max_nesting;
    }

    pub fn analyzers(&self) -> impl Iterator<Item = &dyn Analyzer> {
        self.analyzers.iter().map(|a| a.as_ref())
    }

    pub fn analyzer(&self, name: &str) -> Option<&dyn Analyzer> {
        self.analyzers().find(|a| a.name() == name)
    }

    /// Run every analyzer from scratch and build the report
    ///
    /// Stops at the first failing analyzer; that analyzer is left
    /// uninitialized and no report is produced.
    pub fn analyze(&mut self, model: &CodeModel) -> Result<Report, MetricsError> {
        let scope = Scope::new(model, &self.filter).with_max_nesting(self.max_nesting);
        let namespaces = model.namespaces();

        self.listeners.start_analyze(self.analyzers.len());
        for analyzer in self.analyzers.iter_mut() {
            let name = analyzer.name();
            self.listeners.start_analyzer(name);
            analyzer.reset();
            analyzer.analyze(scope, namespaces, &mut self.listeners)?;
            self.listeners.end_analyzer(name);
        }
        self.listeners.end_analyze();

        let report = build_report(scope, &self.analyzers);
        debug!(nodes = report.nodes.len(), "report assembled");
        Ok(report)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn build_report(scope: Scope<'_>, analyzers: &[Box<dyn Analyzer>]) -> Report {
    let mut report = Report::default();
    let mut measured = BTreeSet::new();
    for analyzer in analyzers {
        let project = analyzer.project_metrics();
        if !project.is_empty() {
            report.project.insert(analyzer.name().to_string(), project);
        }
        measured.extend(analyzer.measured());
    }

    for id in measured {
        if !scope.accepts(id) {
            continue;
        }
        let Some(artifact) = scope.model.get(id) else {
            continue;
        };
        let mut metrics = Metrics::new();
        for analyzer in analyzers {
            metrics.extend(analyzer.node_metrics(id));
        }
        report.nodes.push(NodeReport {
            id,
            name: scope.model.qualified_name(id),
            kind: artifact.kind(),
            metrics,
        });
    }
    report
}
