//! TOML file source for provider options.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// Provider options read from a TOML file.
///
/// A host usually keeps several providers in one file, so a dotted
/// `section` (e.g. `providers.catalog`) selects the table to lift to the
/// root. Missing optional files and missing sections contribute nothing.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
    section: Option<String>,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
            section: None,
        }
    }

    /// Only use the table at `section` inside the file.
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    fn read_table(&self) -> Result<Option<Table>, ConfigError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound && !self.required => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConfigError::FileNotFound(self.path.clone()))
            }
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        toml::from_str(&contents)
            .map(Some)
            .map_err(|source| ConfigError::ParseError {
                path: self.path.clone(),
                source,
            })
    }
}

impl ConfigSource for FileSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        let Some(table) = self.read_table()? else {
            return Ok(vec![]);
        };

        let Some(section) = &self.section else {
            return Ok(vec![ConfigEntry::root(table)]);
        };

        let mut current = &table;
        for part in section.split('.') {
            match current.get(part) {
                Some(Value::Table(nested)) => current = nested,
                _ => return Ok(vec![]),
            }
        }
        Ok(vec![ConfigEntry::root(current.clone())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_source_loads_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "baseUrl = \"http://localhost:8082/v1alpha2/\"").unwrap();

        let entries = FileSource::new(file.path(), true).entries().unwrap();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].path.is_empty());
        let table = entries[0].value.as_table().unwrap();
        assert_eq!(
            table.get("baseUrl"),
            Some(&Value::String("http://localhost:8082/v1alpha2/".into()))
        );
    }

    #[test]
    fn test_file_source_selects_section() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[providers.catalog]\nuser = \"admin\"\n[providers.patch]\nuser = \"other\""
        )
        .unwrap();

        let entries = FileSource::new(file.path(), true)
            .section("providers.catalog")
            .entries()
            .unwrap();
        let table = entries[0].value.as_table().unwrap();
        assert_eq!(table.get("user").and_then(Value::as_str), Some("admin"));
        assert!(table.get("providers").is_none());
    }

    #[test]
    fn test_file_source_missing_section_is_empty() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "user = \"admin\"").unwrap();

        let entries = FileSource::new(file.path(), true)
            .section("providers.catalog")
            .entries()
            .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_file_source_reports_parse_error_with_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "baseUrl = ").unwrap();

        match FileSource::new(file.path(), true).entries() {
            Err(ConfigError::ParseError { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_file_source_required_missing() {
        let source = FileSource::new("/nonexistent/path/catalog-provider.toml", true);
        assert!(matches!(source.entries(), Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_file_source_optional_missing() {
        let source = FileSource::new("/nonexistent/path/catalog-provider.toml", false);
        assert!(source.entries().unwrap().is_empty());
    }
}
