//! Analyzer contract and metric values

use crate::{MetricsError, ProcessListener};
use depend_ast::{ArtifactId, Scope};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A single metric value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(u64),
    Float(f64),
}

impl MetricValue {
    pub fn as_u64(self) -> Option<u64> {
        match self {
            MetricValue::Int(v) => Some(v),
            MetricValue::Float(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            MetricValue::Int(v) => v as f64,
            MetricValue::Float(v) => v,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{:.4}", v),
        }
    }
}

/// Metric name to value, e.g. `ca`, `ce`, `cr`
pub type Metrics = BTreeMap<String, MetricValue>;

/// Lifecycle of an analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyzerState {
    #[default]
    Uninitialized,
    Running,
    Finalized,
}

/// A metric analyzer driven over a set of namespaces
///
/// `analyze` performs the traversal once. Later calls on a finalized
/// analyzer return immediately and keep the computed result; call `reset`
/// to analyze a different artifact set.
pub trait Analyzer {
    /// Short name used in reports and on the command line
    fn name(&self) -> &'static str;

    fn state(&self) -> AnalyzerState;

    fn analyze(
        &mut self,
        scope: Scope<'_>,
        namespaces: &[ArtifactId],
        listener: &mut dyn ProcessListener,
    ) -> Result<(), MetricsError>;

    /// Drop all collected state and return to uninitialized
    fn reset(&mut self);

    /// Metrics of one artifact; empty for artifacts the analyzer never saw
    fn node_metrics(&self, _id: ArtifactId) -> Metrics {
        Metrics::new()
    }

    /// Project-wide totals
    fn project_metrics(&self) -> Metrics {
        Metrics::new()
    }

    /// Artifacts with node metrics, in id order
    fn measured(&self) -> Vec<ArtifactId> {
        Vec::new()
    }
}
