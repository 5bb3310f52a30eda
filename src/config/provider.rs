//! Construction options shared by the catalog and patch providers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Connection options for the catalog/solution backing store.
///
/// Built once and owned by each provider; nothing here is shared
/// process-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(rename = "baseUrl", alias = "base_url", alias = "baseurl", default)]
    pub base_url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, user: impl Into<String>) -> Result<Self, ConfigError> {
        Self {
            base_url: base_url.into(),
            user: user.into(),
            password: String::new(),
        }
        .validate()
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Reads `baseUrl`, `user` and `password` from a provider property map.
    pub fn from_map(properties: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| properties.get(key).cloned().unwrap_or_default();
        Self {
            base_url: get("baseUrl"),
            user: get("user"),
            password: get("password"),
        }
        .validate()
    }

    /// Converts an opaque provider config object.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::MissingField("baseUrl"));
        }
        if self.user.is_empty() {
            return Err(ConfigError::MissingField("user"));
        }
        if self.base_url.trim() != self.base_url {
            return Err(ConfigError::InvalidField {
                field: "baseUrl",
                reason: "surrounding whitespace".into(),
            });
        }
        Ok(self)
    }
}
