//! Artifact filters applied during traversal

use crate::{ArtifactId, CodeModel};
use regex::Regex;

/// Decides whether an artifact takes part in analysis
///
/// A rejected artifact is not visited, and neither is anything below it.
pub trait ArtifactFilter {
    fn accept(&self, model: &CodeModel, id: ArtifactId) -> bool;
}

/// Accepts every artifact
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl ArtifactFilter for AcceptAll {
    fn accept(&self, _model: &CodeModel, _id: ArtifactId) -> bool {
        true
    }
}

/// Rejects artifacts whose namespace matches one of a set of glob patterns
///
/// Patterns use `*` for any run of characters and are matched against the
/// whole namespace name, case-insensitively: `app\Tests*`.
#[derive(Debug, Clone, Default)]
pub struct NamespaceFilter {
    patterns: Vec<Regex>,
}

impl NamespaceFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| glob_to_regex(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn excludes(&self, namespace: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(namespace))
    }
}

fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let escaped: Vec<String> = pattern.split('*').map(regex::escape).collect();
    Regex::new(&format!("(?i)^{}$", escaped.join(".*")))
}

impl ArtifactFilter for NamespaceFilter {
    fn accept(&self, model: &CodeModel, id: ArtifactId) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        match model.namespace_of(id).and_then(|ns| model.get(ns)) {
            Some(namespace) => !self.excludes(&namespace.name),
            None => true,
        }
    }
}

/// Accepts an artifact only if every filter in the chain does
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn ArtifactFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: impl ArtifactFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn with(mut self, filter: impl ArtifactFilter + 'static) -> Self {
        self.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl ArtifactFilter for FilterChain {
    fn accept(&self, model: &CodeModel, id: ArtifactId) -> bool {
        self.filters.iter().all(|f| f.accept(model, id))
    }
}
