use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::{Mapping, Value};

/// API group used in the persisted catalog envelope.
pub const FEDERATION_GROUP: &str = "federation.catalog";

/// The user-authored part of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub catalog_type: String,
    /// Catalog this one inherits missing fields from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub properties: Mapping,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    /// Entity tag of the stored revision; empty for a catalog never stored.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub generation: String,
}

impl CatalogSpec {
    pub fn new(properties: Mapping) -> Self {
        Self {
            properties,
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_name = Some(parent.into());
        self
    }

    /// Parent name, treating an empty string as no parent.
    pub fn parent(&self) -> Option<&str> {
        self.parent_name.as_deref().filter(|p| !p.is_empty())
    }
}

/// A stored catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub id: String,
    pub spec: CatalogSpec,
}

impl Catalog {
    pub fn new(id: impl Into<String>, spec: CatalogSpec) -> Self {
        Self { id: id.into(), spec }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub name: String,
}

/// Persisted envelope: `{apiVersion, kind: "Catalog", metadata: {name}, spec}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub api_version: String,
    pub kind: String,
    pub metadata: CatalogMetadata,
    pub spec: CatalogSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

impl From<&Catalog> for CatalogDocument {
    fn from(catalog: &Catalog) -> Self {
        let mut spec = catalog.spec.clone();
        spec.generation.clear();
        Self {
            api_version: format!("{FEDERATION_GROUP}/v1"),
            kind: "Catalog".to_string(),
            metadata: CatalogMetadata {
                name: catalog.id.clone(),
            },
            spec,
            status: None,
        }
    }
}

impl CatalogDocument {
    /// Rebuilds the catalog, stamping the store's entity tag as its generation.
    pub fn into_catalog(self, etag: impl Into<String>) -> Catalog {
        let mut spec = self.spec;
        spec.generation = etag.into();
        Catalog {
            id: self.metadata.name,
            spec,
        }
    }
}
