//! redb-based persistent cache store

use crate::Result;
use depend_ast::{ArtifactId, CacheError, CacheStore, Token};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use tracing::debug;

// One table per attribute kind
const TOKENS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("tokens");

/// redb-based persistent cache store
///
/// Keys are `scope/id`, so several scopes can share one database file.
/// Values are bincode encoded.
pub struct RedbCache {
    db: Database,
    path: PathBuf,
    scope: String,
}

impl RedbCache {
    /// Create or open a cache database at the given path
    pub fn new(path: impl AsRef<Path>, scope: impl Into<String>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(&path)?;

        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(TOKENS_TABLE)?;
        }
        write_txn.commit()?;

        let scope = scope.into();
        debug!(path = %path.display(), %scope, "opened redb cache");
        Ok(Self { db, path, scope })
    }

    /// Get the file path of this cache
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key(&self, id: ArtifactId) -> String {
        format!("{}/{}", self.scope, id.0)
    }

    fn put_tokens(&self, id: ArtifactId, tokens: &[Token]) -> Result<()> {
        let key = self.key(id);
        let bytes = bincode::serialize(tokens)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TOKENS_TABLE)?;
            table.insert(key.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_tokens(&self, id: ArtifactId) -> Result<Option<Vec<Token>>> {
        let key = self.key(id);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TOKENS_TABLE)?;

        match table.get(key.as_str())? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes.value())?)),
            None => Ok(None),
        }
    }
}

impl CacheStore for RedbCache {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn store_tokens(&mut self, id: ArtifactId, tokens: &[Token]) -> std::result::Result<(), CacheError> {
        Ok(self.put_tokens(id, tokens)?)
    }

    fn restore_tokens(&self, id: ArtifactId) -> std::result::Result<Option<Vec<Token>>, CacheError> {
        Ok(self.get_tokens(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens() -> Vec<Token> {
        vec![
            Token::new(310, "function", 12, 12, 5, 12),
            Token::new(7, "save", 12, 12, 14, 17),
            Token::new(41, "}", 20, 20, 5, 5),
        ]
    }

    #[test]
    fn test_store_and_restore() {
        let dir = tempdir().unwrap();
        let mut cache = RedbCache::new(dir.path().join("cache.redb"), "run").unwrap();

        assert_eq!(cache.restore_tokens(ArtifactId(3)).unwrap(), None);
        cache.store_tokens(ArtifactId(3), &tokens()).unwrap();
        assert_eq!(cache.restore_tokens(ArtifactId(3)).unwrap(), Some(tokens()));
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("cache.redb");

        {
            let mut cache = RedbCache::new(&db_path, "run").unwrap();
            cache.store_tokens(ArtifactId(9), &tokens()).unwrap();
        }

        let cache = RedbCache::new(&db_path, "run").unwrap();
        assert_eq!(cache.restore_tokens(ArtifactId(9)).unwrap(), Some(tokens()));
    }

    #[test]
    fn test_scopes_are_separate() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("cache.redb");

        {
            let mut cache = RedbCache::new(&db_path, "first").unwrap();
            cache.store_tokens(ArtifactId(1), &tokens()).unwrap();
        }

        let cache = RedbCache::new(&db_path, "second").unwrap();
        assert_eq!(cache.restore_tokens(ArtifactId(1)).unwrap(), None);
    }

    #[test]
    fn test_model_tokens_through_redb() {
        use depend_ast::CodeModel;

        let dir = tempdir().unwrap();
        let mut model = CodeModel::new();
        let ns = model.add_namespace("app");
        let class = model.add_class(ns, "User").unwrap();
        model.attach_cache(Box::new(
            RedbCache::new(dir.path().join("cache.redb"), "run").unwrap(),
        ));

        model.set_tokens(class, tokens()).unwrap();
        assert!(model.get(class).unwrap().is_cached());
        assert_eq!(model.get(class).unwrap().start_line(), 12);
        assert_eq!(model.get(class).unwrap().end_line(), 20);
        assert_eq!(model.tokens(class).unwrap(), tokens());
    }
}
