//! Process listeners
//!
//! Listeners observe a run: parsing, the analysis as a whole, each analyzer
//! and each visited node. They never influence the computed metrics.

use depend_ast::{CodeModel, Node};
use tracing::{debug, info};

/// Receives lifecycle notifications; every hook defaults to a no-op
pub trait ProcessListener {
    fn start_parse(&mut self, _source: &str) {}

    fn end_parse(&mut self, _source: &str, _artifacts: usize) {}

    fn start_analyze(&mut self, _analyzers: usize) {}

    fn end_analyze(&mut self) {}

    fn start_analyzer(&mut self, _name: &str) {}

    fn end_analyzer(&mut self, _name: &str) {}

    fn start_visit(&mut self, _model: &CodeModel, _node: Node<'_>) {}

    fn end_visit(&mut self, _model: &CodeModel, _node: Node<'_>) {}
}

/// Ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullListener;

impl ProcessListener for NullListener {}

/// Forwards every notification to each registered listener in order
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<Box<dyn ProcessListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, listener: Box<dyn ProcessListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl ProcessListener for ListenerSet {
    fn start_parse(&mut self, source: &str) {
        self.listeners.iter_mut().for_each(|l| l.start_parse(source));
    }

    fn end_parse(&mut self, source: &str, artifacts: usize) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.end_parse(source, artifacts));
    }

    fn start_analyze(&mut self, analyzers: usize) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.start_analyze(analyzers));
    }

    fn end_analyze(&mut self) {
        self.listeners.iter_mut().for_each(|l| l.end_analyze());
    }

    fn start_analyzer(&mut self, name: &str) {
        self.listeners.iter_mut().for_each(|l| l.start_analyzer(name));
    }

    fn end_analyzer(&mut self, name: &str) {
        self.listeners.iter_mut().for_each(|l| l.end_analyzer(name));
    }

    fn start_visit(&mut self, model: &CodeModel, node: Node<'_>) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.start_visit(model, node));
    }

    fn end_visit(&mut self, model: &CodeModel, node: Node<'_>) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.end_visit(model, node));
    }
}

/// Reports progress through `tracing`
#[derive(Debug, Clone)]
pub struct TracingListener {
    interval: usize,
    visited: usize,
}

impl TracingListener {
    pub fn new() -> Self {
        Self::with_interval(20)
    }

    /// Report every `interval` visited artifacts
    pub fn with_interval(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            visited: 0,
        }
    }

    pub fn visited(&self) -> usize {
        self.visited
    }
}

impl Default for TracingListener {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessListener for TracingListener {
    fn start_parse(&mut self, source: &str) {
        info!(source, "loading code model");
    }

    fn end_parse(&mut self, source: &str, artifacts: usize) {
        info!(source, artifacts, "code model loaded");
    }

    fn start_analyze(&mut self, analyzers: usize) {
        info!(analyzers, "analysis started");
    }

    fn end_analyze(&mut self) {
        info!(visited = self.visited, "analysis finished");
    }

    fn start_analyzer(&mut self, name: &str) {
        self.visited = 0;
        info!(analyzer = name, "running analyzer");
    }

    fn end_analyzer(&mut self, name: &str) {
        info!(analyzer = name, visited = self.visited, "analyzer finished");
    }

    fn start_visit(&mut self, model: &CodeModel, node: Node<'_>) {
        let Some(id) = node.artifact() else {
            return;
        };
        self.visited += 1;
        if self.visited % self.interval == 0 {
            debug!(
                visited = self.visited,
                current = %model.qualified_name(id),
                "progress"
            );
        }
    }
}
