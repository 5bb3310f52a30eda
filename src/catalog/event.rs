//! Change notifications emitted by [`CatalogManager`](super::CatalogManager).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::CatalogSpec;

/// Topic every catalog change is published on.
pub const CATALOG_TOPIC: &str = "catalog";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventAction {
    Update,
}

/// A catalog was written. `metadata["objectType"]` carries the catalog type
/// so subscribers can filter without decoding the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEvent {
    pub metadata: BTreeMap<String, String>,
    pub id: String,
    pub action: EventAction,
    pub body: CatalogSpec,
}

impl CatalogEvent {
    pub fn updated(id: impl Into<String>, spec: CatalogSpec) -> Self {
        Self {
            metadata: BTreeMap::from([("objectType".to_string(), spec.catalog_type.clone())]),
            id: id.into(),
            action: EventAction::Update,
            body: spec,
        }
    }
}

/// Receives catalog change events. Delivery is fire-and-forget.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, topic: &str, event: &CatalogEvent);
}

impl<F> EventPublisher for F
where
    F: Fn(&str, &CatalogEvent) + Send + Sync,
{
    fn publish(&self, topic: &str, event: &CatalogEvent) {
        self(topic, event)
    }
}
