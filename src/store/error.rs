/// Errors returned by a catalog or solution store.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No record with the given id (and scope, for solutions).
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// The entity tag on the write no longer matches the stored revision.
    #[error("{kind} '{id}' was modified concurrently: expected generation {expected}, found {actual}")]
    Conflict {
        kind: &'static str,
        id: String,
        expected: String,
        actual: String,
    },

    /// A record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A backend-specific storage error (connection, lock poisoning, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
