//! Evaluation scopes handed to the [`Evaluator`](crate::Evaluator).

use serde::{Deserialize, Serialize};

use crate::value::{Mapping, Value};

/// The environment a template is resolved against.
///
/// Providers hold one as their base scope and never mutate it; each
/// evaluation works on a clone specialised by a [`ContextOverlay`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationContext {
    #[serde(default)]
    pub inputs: Mapping,
    #[serde(default)]
    pub outputs: Mapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default)]
    pub properties: Mapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_spec: Option<Value>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clones this context, replacing only the fields `overlay` supplies.
    pub fn overlay(&self, overlay: &ContextOverlay) -> EvaluationContext {
        let mut ctx = self.clone();
        if let Some(inputs) = &overlay.inputs {
            ctx.inputs = inputs.clone();
        }
        if let Some(outputs) = &overlay.outputs {
            ctx.outputs = outputs.clone();
        }
        if let Some(value) = &overlay.value {
            ctx.value = Some(value.clone());
        }
        if let Some(properties) = &overlay.properties {
            ctx.properties = properties.clone();
        }
        if let Some(component) = &overlay.component {
            ctx.component = Some(component.clone());
        }
        if let Some(spec) = &overlay.deployment_spec {
            ctx.deployment_spec = Some(spec.clone());
        }
        ctx
    }

    pub fn with_inputs(mut self, inputs: Mapping) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_deployment_spec(mut self, spec: Value) -> Self {
        self.deployment_spec = Some(spec);
        self
    }
}

/// Caller-supplied specialisation of a base [`EvaluationContext`].
///
/// `None` fields inherit from the base.
///
/// ```
/// use catalog_engine::{ContextOverlay, EvaluationContext};
/// use serde_json::json;
///
/// let base = EvaluationContext::new().with_deployment_spec(json!({"name": "site-a"}));
/// let ctx = base.overlay(&ContextOverlay::new().with_value(json!("v")));
/// assert_eq!(ctx.value, Some(json!("v")));
/// assert_eq!(ctx.deployment_spec, Some(json!({"name": "site-a"})));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct ContextOverlay {
    pub inputs: Option<Mapping>,
    pub outputs: Option<Mapping>,
    pub value: Option<Value>,
    pub properties: Option<Mapping>,
    pub component: Option<String>,
    pub deployment_spec: Option<Value>,
}

impl ContextOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs(mut self, inputs: Mapping) -> Self {
        self.inputs = Some(inputs);
        self
    }

    pub fn with_outputs(mut self, outputs: Mapping) -> Self {
        self.outputs = Some(outputs);
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_properties(mut self, properties: Mapping) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with_deployment_spec(mut self, spec: Value) -> Self {
        self.deployment_spec = Some(spec);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> Mapping {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_empty_overlay_is_a_plain_clone() {
        let base = EvaluationContext::new()
            .with_inputs(mapping(json!({"a": 1})))
            .with_deployment_spec(json!({"site": "edge"}));
        assert_eq!(base.overlay(&ContextOverlay::new()), base);
    }

    #[test]
    fn test_overlay_replaces_only_supplied_fields() {
        let base = EvaluationContext::new()
            .with_inputs(mapping(json!({"a": 1})))
            .with_deployment_spec(json!({"site": "edge"}));
        let overlay = ContextOverlay::new()
            .with_properties(mapping(json!({"p": "x"})))
            .with_component("web");

        let ctx = base.overlay(&overlay);
        assert_eq!(ctx.inputs, mapping(json!({"a": 1})));
        assert_eq!(ctx.properties, mapping(json!({"p": "x"})));
        assert_eq!(ctx.component.as_deref(), Some("web"));
        assert_eq!(ctx.deployment_spec, Some(json!({"site": "edge"})));
    }

    #[test]
    fn test_overlay_never_mutates_base() {
        let base = EvaluationContext::new();
        let _ = base.overlay(&ContextOverlay::new().with_value(json!(1)));
        assert_eq!(base.value, None);
    }

    #[test]
    fn test_overlay_replaces_deployment_spec_when_supplied() {
        let base = EvaluationContext::new().with_deployment_spec(json!("old"));
        let ctx = base.overlay(&ContextOverlay::new().with_deployment_spec(json!("new")));
        assert_eq!(ctx.deployment_spec, Some(json!("new")));
    }
}
