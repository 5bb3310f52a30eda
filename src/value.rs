//! The semi-structured value model shared by catalogs, solutions and templates.
//!
//! Values are `serde_json::Value` with insertion-ordered mappings.

pub use serde_json::Value;

/// Insertion-ordered string-keyed mapping.
pub type Mapping = serde_json::Map<String, Value>;

/// Short name of a value's shape, for error messages.
pub fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
