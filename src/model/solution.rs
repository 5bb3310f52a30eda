use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Mapping;

/// One deployable unit of a solution.
///
/// Fields this crate doesn't interpret are kept in `extra` so that a
/// patched solution is written back without losing them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub component_type: String,
    #[serde(default)]
    pub properties: Mapping,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl SolutionSpec {
    pub fn component_mut(&mut self, name: &str) -> Option<&mut ComponentSpec> {
        self.components.iter_mut().find(|c| c.name == name)
    }
}

/// A stored solution, addressed by name within a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub name: String,
    pub scope: String,
    pub spec: SolutionSpec,
    pub etag: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_component_fields_survive() {
        let raw = json!({
            "name": "web",
            "type": "container",
            "properties": {"image": "nginx"},
            "constraints": "${{$equal(1,1)}}"
        });
        let component: ComponentSpec = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(component.component_type, "container");
        assert_eq!(serde_json::to_value(&component).unwrap(), raw);
    }

    #[test]
    fn test_component_requires_name() {
        let result = serde_json::from_value::<ComponentSpec>(json!({"properties": {}}));
        assert!(result.is_err());
    }
}
