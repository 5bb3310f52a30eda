//! Property rules a catalog can opt into through `metadata.schema`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::{shape, Mapping, Value};

/// Expected shape of a single property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Int,
    Uint,
    Float,
    Bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<PropertyType>,
}

/// Rules keyed by property name, stored as the `spec` property of a
/// schema catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub rules: BTreeMap<String, Rule>,
}

/// Outcome of checking properties against a [`Schema`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaResult {
    pub valid: bool,
    /// Reason per offending property.
    pub errors: BTreeMap<String, String>,
}

impl Schema {
    pub fn check_properties(&self, properties: &Mapping) -> SchemaResult {
        let mut errors = BTreeMap::new();

        for (name, rule) in &self.rules {
            match properties.get(name) {
                None if rule.required => {
                    errors.insert(name.clone(), "missing required property".to_string());
                }
                None => {}
                Some(value) => {
                    if let Some(expected) = rule.value_type {
                        if !matches_type(value, expected) {
                            errors.insert(
                                name.clone(),
                                format!("expected {expected:?}, found {}", shape(value))
                                    .to_lowercase(),
                            );
                        }
                    }
                }
            }
        }

        SchemaResult {
            valid: errors.is_empty(),
            errors,
        }
    }
}

// Catalog properties are frequently strings, so textual numbers and
// booleans satisfy the numeric and boolean types.
fn matches_type(value: &Value, expected: PropertyType) -> bool {
    match (expected, value) {
        (PropertyType::String, Value::String(_)) => true,
        (PropertyType::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
        (PropertyType::Int, Value::String(s)) => s.parse::<i64>().is_ok(),
        (PropertyType::Uint, Value::Number(n)) => n.is_u64(),
        (PropertyType::Uint, Value::String(s)) => s.parse::<u64>().is_ok(),
        (PropertyType::Float, Value::Number(_)) => true,
        (PropertyType::Float, Value::String(s)) => s.parse::<f64>().is_ok(),
        (PropertyType::Bool, Value::Bool(_)) => true,
        (PropertyType::Bool, Value::String(s)) => s.parse::<bool>().is_ok(),
        _ => false,
    }
}
