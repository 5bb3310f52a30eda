//! Storage seams for catalogs and solutions.
//!
//! This crate does not retry or lock across calls. Lost-update protection
//! comes from the store's entity tag check: a record written back with the
//! `generation` it was read at fails with [`StoreError::Conflict`] if
//! someone else wrote in between.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::{MemoryCatalogStore, MemorySolutionStore};

use crate::model::{Catalog, Solution, SolutionSpec};

/// Default scope for solutions addressed without one.
pub const DEFAULT_SCOPE: &str = "default";

/// Key-value persistence for catalogs.
pub trait CatalogStore: Send + Sync {
    /// Fetches a catalog, with `spec.generation` set to its entity tag.
    fn get(&self, id: &str) -> Result<Catalog, StoreError>;

    /// Creates or replaces a catalog and returns the new entity tag.
    ///
    /// A non-empty `spec.generation` must match the stored revision.
    fn upsert(&self, id: &str, catalog: &Catalog) -> Result<String, StoreError>;

    fn delete(&self, id: &str) -> Result<(), StoreError>;

    fn list(&self) -> Result<Vec<Catalog>, StoreError>;
}

/// Key-value persistence for solutions, partitioned by scope.
pub trait SolutionStore: Send + Sync {
    fn get(&self, name: &str, scope: &str) -> Result<Solution, StoreError>;

    fn upsert(&self, name: &str, scope: &str, spec: &SolutionSpec) -> Result<(), StoreError>;
}
