use crate::store::DEFAULT_SCOPE;
use crate::value::{Mapping, Value};
use crate::{Error, Result};

/// Where the patch payload comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchSource {
    /// `patchContent` names a catalog whose properties are the payload.
    Catalog,
    /// `patchContent` is the payload itself.
    Inline,
}

impl PatchSource {
    pub fn parse(source: &str) -> Result<Self> {
        match source {
            "" | "catalog" => Ok(PatchSource::Catalog),
            "inline" => Ok(PatchSource::Inline),
            other => Err(Error::BadConfig(format!(
                "patchSource '{other}' is not valid"
            ))),
        }
    }
}

/// What to do with the addressed entry or component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatchAction {
    /// Replace a matching entry, or append when none matches.
    #[default]
    Add,
    /// Delete a matching entry.
    Remove,
}

impl PatchAction {
    /// `"remove"` removes; every other value, including empty, adds.
    pub fn parse(action: &str) -> Self {
        if action == "remove" {
            PatchAction::Remove
        } else {
            PatchAction::Add
        }
    }
}

/// A patch stage invocation, decoded from its stage inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchRequest {
    pub object_type: String,
    pub object_name: String,
    pub object_scope: String,
    pub source: PatchSource,
    pub content: Option<Value>,
    pub component_name: String,
    pub property_name: String,
    pub sub_key: String,
    pub dedup_key: String,
    pub action: PatchAction,
    /// Becomes the ambient `value` when tracing the payload.
    pub context: Option<Value>,
}

impl PatchRequest {
    /// Reads the request from stage inputs.
    ///
    /// String inputs that are absent or not strings read as empty. Only an
    /// unknown `patchSource` is rejected here.
    pub fn from_inputs(inputs: &Mapping) -> Result<Self> {
        let read = |key: &str| read_input_string(inputs, key);
        Ok(Self {
            object_type: read("objectType"),
            object_name: read("objectName"),
            object_scope: read("objectScope"),
            source: PatchSource::parse(&read("patchSource"))?,
            content: inputs.get("patchContent").cloned(),
            component_name: read("component"),
            property_name: read("property"),
            sub_key: read("subKey"),
            dedup_key: read("dedupKey"),
            action: PatchAction::parse(&read("patchAction")),
            context: inputs.get("context").cloned(),
        })
    }

    pub fn scope(&self) -> &str {
        if self.object_scope.is_empty() {
            DEFAULT_SCOPE
        } else {
            &self.object_scope
        }
    }
}

fn read_input_string(inputs: &Mapping, key: &str) -> String {
    match inputs.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}
