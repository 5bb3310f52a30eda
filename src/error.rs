use thiserror::Error;

use crate::config::ConfigError;
use crate::evaluator::EvalError;
use crate::store::StoreError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for catalog resolution and patching.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Malformed provider configuration or patch addressing/content.
    #[error("bad config: {0}")]
    BadConfig(String),

    /// Missing catalog, solution, field or sub-key.
    #[error("not found: {0}")]
    NotFound(String),

    /// A catalog failed schema or reference validation.
    #[error("validation failed: {0}")]
    ValidateFailed(String),

    /// A parent chain or nested evaluation did not terminate.
    #[error("cycle detected: {0}")]
    CycleDetected(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse classification of an [`Error`], stable across passthrough sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadConfig,
    NotFound,
    ValidateFailed,
    CycleDetected,
    Store,
    Eval,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadConfig(_) => ErrorKind::BadConfig,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::ValidateFailed(_) => ErrorKind::ValidateFailed,
            Error::CycleDetected(_) => ErrorKind::CycleDetected,
            Error::Store(StoreError::NotFound { .. }) => ErrorKind::NotFound,
            Error::Store(_) => ErrorKind::Store,
            Error::Eval(_) => ErrorKind::Eval,
            Error::Config(ConfigError::MissingField(_) | ConfigError::InvalidField { .. }) => {
                ErrorKind::BadConfig
            }
            Error::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn bad_config(msg: impl Into<String>) -> Self {
        Error::BadConfig(msg.into())
    }
}
