//! Error types for the returns engine and its loaders

use thiserror::Error;

/// Errors raised by the returns engine before any computation happens
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Input outside the domain of the calculation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl EngineError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidArgument(message.into())
    }
}

/// Errors raised while loading plan files or investor holdings
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record parsed but carried a value the domain rejects
    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    /// An environment override that does not parse
    #[error("invalid override {key}={value:?}")]
    InvalidOverride { key: String, value: String },

    #[error(transparent)]
    Invalid(#[from] EngineError),
}

pub type EngineResult<T> = Result<T, EngineError>;
