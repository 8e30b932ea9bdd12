//! Errors raised while building catalogs and configuration.

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while constructing core values.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A step catalog needs at least one step
    #[error("step catalog is empty")]
    EmptyCatalog,

    /// Configuration failed validation
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
