//! Cache driver selection

use crate::{MemoryCache, RedbCache, Result};
use depend_ast::CacheStore;
use serde::Deserialize;
use std::path::PathBuf;

/// Which cache driver to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheDriver {
    #[default]
    Memory,
    Redb,
}

/// `[cache]` section of the configuration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub driver: CacheDriver,
    /// Database file of the redb driver
    pub location: PathBuf,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            driver: CacheDriver::Memory,
            location: PathBuf::from(".depend/cache.redb"),
        }
    }
}

/// Open the configured cache store for a scope
pub fn open_cache(settings: &CacheSettings, scope: &str) -> Result<Box<dyn CacheStore>> {
    Ok(match settings.driver {
        CacheDriver::Memory => Box::new(MemoryCache::new(scope)),
        CacheDriver::Redb => Box::new(RedbCache::new(&settings.location, scope)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_memory() {
        let settings: CacheSettings = toml::from_str("").unwrap();
        assert_eq!(settings.driver, CacheDriver::Memory);
        assert_eq!(open_cache(&settings, "run").unwrap().scope(), "run");
    }

    #[test]
    fn test_redb_driver_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("cache.redb");
        let text = format!(
            "driver = \"redb\"\nlocation = {:?}\n",
            location.display().to_string()
        );
        let settings: CacheSettings = toml::from_str(&text).unwrap();
        assert_eq!(settings.driver, CacheDriver::Redb);

        open_cache(&settings, "run").unwrap();
        assert!(location.exists());
    }
}
