//! depend metrics - Analyzers over the code model
//!
//! Two analyzers share one traversal protocol:
//! - [`CouplingAnalyzer`]: afferent/efferent coupling, fanout, call counts
//! - [`CodeRankAnalyzer`]: PageRank-style rank over the dependency graph
//!
//! The [`Engine`] runs a set of analyzers with a common filter and process
//! listeners and assembles a [`Report`].

mod analyzer;
pub mod coderank;
mod coupling;
mod engine;
mod error;
mod listener;

pub use analyzer::{Analyzer, AnalyzerState, MetricValue, Metrics};
pub use coderank::{
    CodeRankAnalyzer, CodeRankSettings, EdgeStrategy, Flow, GraphNode, Granularity, NodeRank,
    NodeTable, Relaxation,
};
pub use coupling::{
    CouplingAnalyzer, NodeCoupling, METRIC_CA, METRIC_CALLS, METRIC_CBO, METRIC_CE, METRIC_FANOUT,
};
pub use engine::{Engine, NodeReport, Report};
pub use error::MetricsError;
pub use listener::{ListenerSet, NullListener, ProcessListener, TracingListener};
