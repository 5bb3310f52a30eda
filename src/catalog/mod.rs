//! Catalog-backed configuration: value reads with inheritance, writes,
//! and validated catalog management.

mod event;
mod manager;
mod provider;
mod schema;

pub use event::{CatalogEvent, EventAction, EventPublisher, CATALOG_TOPIC};
pub use manager::{CatalogManager, SCHEMA_METADATA_KEY};
pub use provider::CatalogConfigProvider;
pub use schema::{PropertyType, Rule, Schema, SchemaResult};
