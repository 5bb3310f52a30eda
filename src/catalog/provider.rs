use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::config::ProviderConfig;
use crate::context::{ContextOverlay, EvaluationContext};
use crate::evaluator::Evaluator;
use crate::model::Catalog;
use crate::store::CatalogStore;
use crate::trace::Tracer;
use crate::value::{Mapping, Value};
use crate::{Error, Result};

/// Reads and writes configuration values held in catalogs.
///
/// A field missing on a catalog is looked up along its parent chain.
/// Only the catalog the read starts at has its templates evaluated;
/// values inherited from ancestors are returned as stored.
pub struct CatalogConfigProvider {
    config: ProviderConfig,
    store: Arc<dyn CatalogStore>,
    tracer: Tracer,
}

impl std::fmt::Debug for CatalogConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfigProvider")
            .field("base_url", &self.config.base_url)
            .field("user", &self.config.user)
            .finish_non_exhaustive()
    }
}

impl CatalogConfigProvider {
    pub fn new(
        config: ProviderConfig,
        store: Arc<dyn CatalogStore>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Self {
            config,
            store,
            tracer: Tracer::new(evaluator, EvaluationContext::default()),
        }
    }

    /// Sets the base evaluation context supplied by the owning manager.
    pub fn with_context(self, context: EvaluationContext) -> Self {
        Self {
            tracer: self.tracer.with_base(context),
            ..self
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Resolves `field` on catalog `object`, falling back to its ancestors.
    pub fn read(&self, object: &str, field: &str, local: Option<&ContextOverlay>) -> Result<Value> {
        let catalog = self.store.get(object)?;

        if let Some(value) = catalog.spec.properties.get(field) {
            return self.tracer.trace(value, &local.cloned().unwrap_or_default());
        }

        match catalog.spec.parent() {
            Some(parent) => self.unwind_overrides(object, parent, field),
            None => Err(field_not_found(field, object)),
        }
    }

    fn unwind_overrides(&self, origin: &str, parent: &str, field: &str) -> Result<Value> {
        let mut visited = HashSet::from([origin.to_string()]);
        let mut next = parent.to_string();

        loop {
            if !visited.insert(next.clone()) {
                return Err(Error::CycleDetected(format!(
                    "catalog '{next}' appears twice in the parent chain of '{origin}'"
                )));
            }
            debug!(catalog = %next, field, "following override chain");

            let catalog = self.store.get(&next)?;
            if let Some(value) = catalog.spec.properties.get(field) {
                return Ok(value.clone());
            }
            match catalog.spec.parent() {
                Some(parent) => next = parent.to_string(),
                None => return Err(field_not_found(field, origin)),
            }
        }
    }

    /// Resolves every property of `object`.
    ///
    /// A property that traces to a mapping is spliced into the result
    /// instead of being stored under its own key. Spliced keys never
    /// replace keys already present, while plain properties always do,
    /// so local values win over referenced ones.
    pub fn read_object(&self, object: &str, local: Option<&ContextOverlay>) -> Result<Mapping> {
        let catalog = self.store.get(object)?;
        let overlay = local.cloned().unwrap_or_default();

        let mut ret = Mapping::new();
        for (key, value) in &catalog.spec.properties {
            match self.tracer.trace(value, &overlay)? {
                Value::Object(expanded) => {
                    for (k, v) in expanded {
                        if !ret.contains_key(&k) {
                            ret.insert(k, v);
                        }
                    }
                }
                traced => {
                    ret.insert(key.clone(), traced);
                }
            }
        }
        Ok(ret)
    }

    pub fn set(&self, object: &str, field: &str, value: Value) -> Result<()> {
        let mut catalog = self.store.get(object)?;
        catalog.spec.properties.insert(field.to_string(), value);
        self.write(object, &catalog)
    }

    /// Replaces all properties of `object`.
    pub fn set_object(&self, object: &str, value: Mapping) -> Result<()> {
        let mut catalog = self.store.get(object)?;
        catalog.spec.properties = value;
        self.write(object, &catalog)
    }

    pub fn remove(&self, object: &str, field: &str) -> Result<()> {
        let mut catalog = self.store.get(object)?;
        if catalog.spec.properties.shift_remove(field).is_none() {
            return Err(field_not_found(field, object));
        }
        self.write(object, &catalog)
    }

    pub fn remove_object(&self, object: &str) -> Result<()> {
        Ok(self.store.delete(object)?)
    }

    fn write(&self, object: &str, catalog: &Catalog) -> Result<()> {
        let etag = self.store.upsert(object, catalog)?;
        debug!(catalog = object, %etag, "catalog updated");
        Ok(())
    }
}

fn field_not_found(field: &str, object: &str) -> Error {
    Error::NotFound(format!(
        "field '{field}' is not found in configuration '{object}'"
    ))
}
