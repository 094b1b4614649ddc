//! Model dump reading

use anyhow::{Context, Result};
use depend_ast::{ArtifactId, CodeModel, Token};
use depend_storage::{open_cache, CacheSettings};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// A code model as written by the parser front end
#[derive(Debug, Deserialize)]
pub struct ModelFile {
    pub model: CodeModel,
    /// Token lists per artifact, moved into the cache on load
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TokenEntry {
    pub id: ArtifactId,
    pub tokens: Vec<Token>,
}

impl ModelFile {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Rebuild the registry, attach the cache and store every token list
    pub fn into_model(self, cache: &CacheSettings, scope: &str) -> Result<CodeModel> {
        let mut model = self.model;
        model.reindex();
        let store = open_cache(cache, scope).context("failed to open cache")?;
        model.attach_cache(store);
        for entry in self.tokens {
            model
                .set_tokens(entry.id, entry.tokens)
                .with_context(|| format!("failed to store tokens of {}", entry.id))?;
        }
        debug!(artifacts = model.len(), "model ready");
        Ok(model)
    }
}

/// Read a model dump and prepare it for analysis
pub fn load_model(path: &Path, cache: &CacheSettings) -> Result<CodeModel> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file = ModelFile::parse(&content)
        .with_context(|| format!("{} is not a model dump", path.display()))?;
    let scope = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    file.into_model(cache, scope)
}
