//! `depend.toml` configuration

use anyhow::{Context, Result};
use depend_ast::{NamespaceFilter, DEFAULT_NESTING_LIMIT};
use depend_metrics::CodeRankSettings;
use depend_storage::CacheSettings;
use serde::Deserialize;
use std::path::Path;

/// File names tried, in order, when no configuration file is given
pub const CANDIDATES: [&str; 2] = ["depend.toml", ".depend.toml"];

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub cache: CacheSettings,
    pub parser: ParserSettings,
    pub coderank: CodeRankSettings,
    pub filter: FilterSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Maximum expression nesting depth before traversal gives up
    pub nesting: usize,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            nesting: DEFAULT_NESTING_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Glob patterns of namespaces left out of the analysis
    pub exclude_namespaces: Vec<String>,
}

impl FilterSettings {
    pub fn namespace_filter(&self) -> Result<NamespaceFilter> {
        NamespaceFilter::new(&self.exclude_namespaces).context("invalid namespace pattern")
    }
}

impl Configuration {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid configuration in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the given file, or the first candidate present, or defaults
    ///
    /// A file named explicitly must exist.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        for candidate in &CANDIDATES {
            if Path::new(candidate).exists() {
                return Self::load(candidate);
            }
        }
        Ok(Self::default())
    }
}
