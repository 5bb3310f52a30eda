use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use super::event::{CatalogEvent, EventPublisher, CATALOG_TOPIC};
use super::schema::{Schema, SchemaResult};
use crate::model::{Catalog, CatalogSpec};
use crate::store::{CatalogStore, StoreError};
use crate::{Error, Result};

/// Metadata key naming the schema catalog a catalog must satisfy.
pub const SCHEMA_METADATA_KEY: &str = "schema";

/// CRUD over catalogs with validation on write.
///
/// Writes are checked against an optional schema catalog and must keep
/// the parent graph acyclic with every parent present. Successful writes
/// are announced on [`CATALOG_TOPIC`] when a publisher is attached.
pub struct CatalogManager {
    store: Arc<dyn CatalogStore>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl std::fmt::Debug for CatalogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogManager")
            .field("publisher", &self.publisher.is_some())
            .finish_non_exhaustive()
    }
}

impl CatalogManager {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn get_spec(&self, name: &str) -> Result<Catalog> {
        Ok(self.store.get(name)?)
    }

    pub fn list_spec(&self) -> Result<Vec<Catalog>> {
        Ok(self.store.list()?)
    }

    pub fn delete_spec(&self, name: &str) -> Result<()> {
        self.store.delete(name)?;
        info!(catalog = name, "catalog deleted");
        Ok(())
    }

    /// Validates and stores `spec` under `name`, returning the new entity tag.
    pub fn upsert_spec(&self, name: &str, spec: CatalogSpec) -> Result<String> {
        let result = self.validate_spec(&spec)?;
        if !result.valid {
            let reasons: Vec<String> = result
                .errors
                .iter()
                .map(|(field, reason)| format!("{field}: {reason}"))
                .collect();
            return Err(Error::ValidateFailed(format!(
                "schema validation error: {}",
                reasons.join("; ")
            )));
        }
        self.check_parent(name, &spec)?;

        let catalog = Catalog::new(name, spec);
        let etag = self.store.upsert(name, &catalog)?;
        info!(catalog = name, %etag, "catalog stored");

        if let Some(publisher) = &self.publisher {
            publisher.publish(CATALOG_TOPIC, &CatalogEvent::updated(name, catalog.spec));
        }
        Ok(etag)
    }

    /// Checks `spec.properties` against the schema named in its metadata.
    ///
    /// Catalogs without a schema are always valid.
    pub fn validate_spec(&self, spec: &CatalogSpec) -> Result<SchemaResult> {
        let Some(schema_name) = spec.metadata.get(SCHEMA_METADATA_KEY) else {
            return Ok(SchemaResult {
                valid: true,
                ..Default::default()
            });
        };

        let schema_catalog = self.store.get(schema_name).map_err(|e| match e {
            StoreError::NotFound { .. } => {
                Error::ValidateFailed(format!("schema '{schema_name}' not found"))
            }
            other => Error::Store(other),
        })?;
        let raw = schema_catalog.spec.properties.get("spec").ok_or_else(|| {
            Error::ValidateFailed(format!("schema '{schema_name}' has no spec property"))
        })?;
        let schema: Schema = serde_json::from_value(raw.clone())
            .map_err(|e| Error::ValidateFailed(format!("invalid schema '{schema_name}': {e}")))?;

        Ok(schema.check_properties(&spec.properties))
    }

    fn check_parent(&self, name: &str, spec: &CatalogSpec) -> Result<()> {
        let mut visited = HashSet::from([name.to_string()]);
        let mut next = spec.parent().map(str::to_string);

        while let Some(current) = next {
            if !visited.insert(current.clone()) {
                return Err(Error::CycleDetected(format!(
                    "parent '{current}' of catalog '{name}' leads back into its own chain"
                )));
            }
            let parent = self.store.get(&current).map_err(|e| match e {
                StoreError::NotFound { .. } => Error::ValidateFailed(format!(
                    "parent catalog '{current}' of '{name}' does not exist"
                )),
                other => Error::Store(other),
            })?;
            debug!(catalog = name, parent = %current, "parent verified");
            next = parent.spec.parent().map(str::to_string);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EventAction;
    use crate::store::MemoryCatalogStore;
    use std::sync::Mutex;
    use crate::value::{Mapping, Value};
    use crate::ErrorKind;
    use serde_json::json;

    fn mapping(value: Value) -> Mapping {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn manager() -> CatalogManager {
        CatalogManager::new(Arc::new(MemoryCatalogStore::new()))
    }

    fn with_schema(properties: Value) -> CatalogSpec {
        let mut spec = CatalogSpec::new(mapping(properties));
        spec.metadata
            .insert(SCHEMA_METADATA_KEY.to_string(), "email-schema".to_string());
        spec
    }

    #[test]
    fn test_upsert_and_get() {
        let m = manager();
        let etag = m.upsert_spec("c1", CatalogSpec::new(mapping(json!({"a": "1"})))).unwrap();
        assert_eq!(etag, "1");

        let catalog = m.get_spec("c1").unwrap();
        assert_eq!(catalog.spec.properties["a"], json!("1"));
        assert_eq!(m.list_spec().unwrap().len(), 1);

        m.delete_spec("c1").unwrap();
        assert_eq!(m.get_spec("c1").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_schema_validation() {
        let m = manager();
        m.upsert_spec(
            "email-schema",
            CatalogSpec::new(mapping(json!({
                "spec": {"rules": {"email": {"required": true, "type": "string"}}}
            }))),
        )
        .unwrap();

        m.upsert_spec("ok", with_schema(json!({"email": "a@b.c"}))).unwrap();

        let err = m.upsert_spec("bad", with_schema(json!({"name": "x"}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidateFailed);
        assert!(err.to_string().contains("email"));
        assert!(m.get_spec("bad").is_err());
    }

    #[test]
    fn test_missing_schema_fails_validation() {
        let err = manager()
            .upsert_spec("c1", with_schema(json!({})))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidateFailed);
    }

    #[test]
    fn test_malformed_schema_fails_validation() {
        let m = manager();
        m.upsert_spec("email-schema", CatalogSpec::new(mapping(json!({"spec": "nope"}))))
            .unwrap();
        let err = m.upsert_spec("c1", with_schema(json!({}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidateFailed);
    }

    #[test]
    fn test_parent_must_exist() {
        let m = manager();
        let err = m
            .upsert_spec("child", CatalogSpec::new(Mapping::new()).with_parent("base"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidateFailed);

        m.upsert_spec("base", CatalogSpec::new(Mapping::new())).unwrap();
        m.upsert_spec("child", CatalogSpec::new(Mapping::new()).with_parent("base"))
            .unwrap();
    }

    #[test]
    fn test_successful_upsert_publishes_one_update() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let m = manager().with_publisher(Arc::new(move |topic: &str, event: &CatalogEvent| {
            sink.lock().unwrap().push((topic.to_string(), event.clone()));
        }));

        let mut spec = with_schema(json!({"name": "x"}));
        spec.catalog_type = "config".to_string();
        assert!(m.upsert_spec("rejected", spec).is_err());
        assert!(events.lock().unwrap().is_empty());

        let mut spec = CatalogSpec::new(mapping(json!({"a": "1"})));
        spec.catalog_type = "config".to_string();
        m.upsert_spec("c1", spec).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        let (topic, event) = &events[0];
        assert_eq!(topic, CATALOG_TOPIC);
        assert_eq!(event.id, "c1");
        assert_eq!(event.action, EventAction::Update);
        assert_eq!(event.metadata["objectType"], "config");
        assert_eq!(event.body.properties["a"], json!("1"));
    }

    #[test]
    fn test_reparenting_into_a_cycle_is_rejected() {
        let m = manager();
        m.upsert_spec("a", CatalogSpec::new(Mapping::new())).unwrap();
        m.upsert_spec("b", CatalogSpec::new(Mapping::new()).with_parent("a"))
            .unwrap();
        m.upsert_spec("c", CatalogSpec::new(Mapping::new()).with_parent("b"))
            .unwrap();

        let err = m
            .upsert_spec("a", CatalogSpec::new(Mapping::new()).with_parent("c"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CycleDetected);

        let err = m
            .upsert_spec("a", CatalogSpec::new(Mapping::new()).with_parent("a"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CycleDetected);
    }
}
