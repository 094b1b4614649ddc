//! depend - Static dependency metrics for object-oriented code
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use depend_ast as ast;
pub use depend_hierarchy as hierarchy;
pub use depend_metrics as metrics;
pub use depend_storage as storage;
