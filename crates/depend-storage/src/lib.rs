//! depend Storage - Cache store drivers
//!
//! Drivers for the [`CacheStore`](depend_ast::CacheStore) port, which holds
//! artifact attributes evicted from the in-memory model:
//! - In-memory (for tests and short runs)
//! - redb (persistent embedded database, one file per cache location)
//!
//! Entries are keyed by scope and artifact id, one table per attribute kind.

mod error;
mod memory;
mod redb_cache;
mod settings;

pub use error::{Result, StorageError};
pub use memory::MemoryCache;
pub use redb_cache::RedbCache;
pub use settings::{open_cache, CacheDriver, CacheSettings};
