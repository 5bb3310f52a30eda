//! Catalog and solution records as stored and exchanged.

mod catalog;
mod solution;

pub use catalog::{Catalog, CatalogDocument, CatalogMetadata, CatalogSpec, FEDERATION_GROUP};
pub use solution::{ComponentSpec, Solution, SolutionSpec};
