use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;

use super::env::EnvSource;
use super::file::FileSource;
use super::source::{merge_at_path, ConfigSource, MapSource};
use super::ConfigError;

/// Layered loader for provider options.
///
/// Sources are merged in registration order, with later sources overriding
/// earlier ones. Nested tables are merged recursively; other values
/// (including arrays) are replaced entirely.
///
/// ## Example
///
/// ```no_run
/// use catalog_engine::{Config, ProviderConfig};
///
/// let config: ProviderConfig = Config::builder()
///     .with_file_section("host.toml", true, "providers.catalog")
///     .with_env("CATALOG", "__")
///     .build()?;
/// # Ok::<(), catalog_engine::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a TOML file. Missing optional files are skipped.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Adds the table at dotted `section` of a TOML file.
    pub fn with_file_section(
        self,
        path: impl AsRef<Path>,
        required: bool,
        section: impl Into<String>,
    ) -> Self {
        self.with_source(FileSource::new(path, required).section(section))
    }

    /// Adds environment variables named `<prefix><separator><field>`.
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Adds a flat property map, as passed to a provider by its host.
    pub fn with_properties(self, properties: HashMap<String, String>) -> Self {
        self.with_source(MapSource::new(properties))
    }

    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Merges every source and deserializes the result once.
    pub fn build<T: DeserializeOwned>(self) -> Result<T, ConfigError> {
        let mut merged = toml::Table::new();

        for source in &self.sources {
            for entry in source.entries()? {
                merge_at_path(&mut merged, &entry.path, entry.value);
            }
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(ConfigError::DeserializeError)
    }
}
