use toml::Value;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// Environment variables under `PREFIX<sep>`, mapped to lowercase config paths.
///
/// `CATALOG__BASE_URL` with prefix `CATALOG` and separator `__` lands at
/// `base_url`. Values are kept as strings since every provider option is textual.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }

    fn collect(&self, vars: impl Iterator<Item = (String, String)>) -> Vec<ConfigEntry> {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);

        vars.filter_map(|(key, value)| {
            let path_str = key.strip_prefix(&prefix_with_sep)?;
            if path_str.is_empty() {
                return None;
            }
            let path = path_str
                .split(&self.separator)
                .map(|s| s.to_lowercase())
                .collect();
            Some(ConfigEntry::at_path(path, Value::String(value)))
        })
        .collect()
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        Ok(self.collect(std::env::vars()))
    }
}
