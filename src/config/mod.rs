//! Provider configuration loading.

mod builder;
mod env;
mod error;
mod file;
mod provider;
mod source;

pub use builder::Config;
pub use env::EnvSource;
pub use error::ConfigError;
pub use file::FileSource;
pub use provider::ProviderConfig;
pub use source::{ConfigEntry, ConfigSource, MapSource};
