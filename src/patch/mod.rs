//! The patch stage: resolve a payload, then upsert or remove it inside a
//! stored solution.

mod apply;
mod request;

pub use apply::{patch_component, patch_property, patch_sequence};
pub use request::{PatchAction, PatchRequest, PatchSource};

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::ProviderConfig;
use crate::context::{ContextOverlay, EvaluationContext};
use crate::evaluator::Evaluator;
use crate::model::ComponentSpec;
use crate::store::{CatalogStore, SolutionStore};
use crate::trace::Tracer;
use crate::value::{shape, Mapping, Value};
use crate::{Error, Result};

/// Object type whose components the patch stage can edit.
pub const SOLUTION_OBJECT_TYPE: &str = "solution";

/// Result of a stage run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageResult {
    pub outputs: Mapping,
    /// Whether the stage wants to be invoked again.
    pub pending: bool,
}

/// Applies patch requests to solutions.
///
/// The target solution is written back only when the patch changed it,
/// and only after every lookup and shape check has passed.
pub struct PatchStageProvider {
    config: ProviderConfig,
    catalogs: Arc<dyn CatalogStore>,
    solutions: Arc<dyn SolutionStore>,
    tracer: Tracer,
}

impl std::fmt::Debug for PatchStageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchStageProvider")
            .field("base_url", &self.config.base_url)
            .field("user", &self.config.user)
            .finish_non_exhaustive()
    }
}

impl PatchStageProvider {
    pub fn new(
        config: ProviderConfig,
        catalogs: Arc<dyn CatalogStore>,
        solutions: Arc<dyn SolutionStore>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Self {
            config,
            catalogs,
            solutions,
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

    /// Runs the stage with raw stage inputs.
    ///
    /// Outputs are always empty and the stage never asks to run again.
    pub fn process(&self, inputs: &Mapping) -> Result<StageResult> {
        info!("patch request started");
        let request = PatchRequest::from_inputs(inputs).inspect_err(|e| {
            error!(error = %e, "invalid patch request");
        })?;
        self.process_request(&request)?;
        info!("patch request finished");
        Ok(StageResult::default())
    }

    pub fn process_request(&self, req: &PatchRequest) -> Result<()> {
        let payload = self.resolve_payload(req)?;

        let overlay = match &req.context {
            Some(context) => ContextOverlay::new().with_value(context.clone()),
            None => ContextOverlay::new(),
        };
        let payload = self.tracer.trace_mapping(&payload, &overlay).inspect_err(|e| {
            error!(error = %e, "failed to trace patch payload");
        })?;

        match req.object_type.as_str() {
            SOLUTION_OBJECT_TYPE => self.patch_solution(req, &payload),
            other => {
                debug!(object_type = other, "unsupported object type, skipping");
                Ok(())
            }
        }
    }

    fn resolve_payload(&self, req: &PatchRequest) -> Result<Mapping> {
        match (req.source, req.component_name.is_empty()) {
            (PatchSource::Catalog, _) => {
                let Some(Value::String(name)) = &req.content else {
                    error!("patchContent must name a catalog");
                    return Err(Error::bad_config(
                        "patchContent is not valid: expected a catalog name",
                    ));
                };
                let catalog = self.catalogs.get(name).inspect_err(|e| {
                    error!(catalog = %name, error = %e, "failed to get patch catalog");
                })?;
                Ok(catalog.spec.properties)
            }
            (PatchSource::Inline, false) => match &req.content {
                Some(Value::Object(map)) => Ok(map.clone()),
                other => {
                    let found = other.as_ref().map_or("nothing", shape);
                    error!(found, "inline patchContent must be a mapping");
                    Err(Error::BadConfig(format!(
                        "patchContent is not valid: expected mapping, found {found}"
                    )))
                }
            },
            (PatchSource::Inline, true) => {
                let content = req.content.clone().unwrap_or(Value::Null);
                let component: ComponentSpec = serde_json::from_value(content).map_err(|e| {
                    error!(error = %e, "failed to decode component spec");
                    Error::BadConfig(format!("patchContent is not a valid component: {e}"))
                })?;
                let spec = serde_json::to_value(component)
                    .map_err(|e| Error::BadConfig(format!("component spec: {e}")))?;
                Ok(Mapping::from_iter([("spec".to_string(), spec)]))
            }
        }
    }

    fn patch_solution(&self, req: &PatchRequest, payload: &Mapping) -> Result<()> {
        let scope = req.scope();
        let mut solution = self
            .solutions
            .get(&req.object_name, scope)
            .inspect_err(|e| {
                error!(solution = %req.object_name, error = %e, "failed to get solution");
            })?;

        let updated = if req.component_name.is_empty() {
            let component = component_from_payload(payload)?;
            patch_component(&mut solution.spec.components, component, req.action)
        } else {
            match solution.spec.component_mut(&req.component_name) {
                Some(component) => patch_property(
                    component,
                    &req.property_name,
                    &req.sub_key,
                    payload,
                    &req.dedup_key,
                    req.action,
                )
                .inspect_err(|e| {
                    error!(solution = %req.object_name, error = %e, "patch target is not valid");
                })?,
                None => {
                    debug!(component = %req.component_name, "component not in solution");
                    false
                }
            }
        };

        if !updated {
            debug!(solution = %req.object_name, "nothing to update");
            return Ok(());
        }

        self.solutions
            .upsert(&req.object_name, scope, &solution.spec)
            .inspect_err(|e| {
                error!(solution = %req.object_name, error = %e, "failed to update solution");
            })?;
        info!(solution = %req.object_name, scope, "solution updated");
        Ok(())
    }
}

fn component_from_payload(payload: &Mapping) -> Result<ComponentSpec> {
    let spec = payload
        .get("spec")
        .ok_or_else(|| Error::bad_config("patch payload has no component 'spec'"))?;
    serde_json::from_value(spec.clone())
        .map_err(|e| Error::BadConfig(format!("patch payload 'spec' is not a component: {e}")))
}
