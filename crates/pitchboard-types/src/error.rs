use thiserror::Error;

/// Closed error taxonomy for every boundary operation. Constructed at the
/// store-access boundary; raw store text only survives inside
/// `OperationFailed` and log lines.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    ConfigurationError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    OperationFailed(String),
}

impl ActionError {
    /// Capture an opaque store/network fault, keeping only its message.
    pub fn from_store<E: std::fmt::Display>(err: E) -> Self {
        ActionError::OperationFailed(err.to_string())
    }
}
