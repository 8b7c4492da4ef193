use thiserror::Error;

/// Failures raised by a data source. Passed through the core untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("data source unreachable: {0}")]
    Connectivity(String),
    #[error("data source schema mismatch: {0}")]
    SchemaMismatch(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("input unavailable: {0}")]
    InputUnavailable(#[from] SourceError),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("export failed: {0}")]
    Export(String),
}

impl DataError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        DataError::InvalidParameter(msg.into())
    }
}
