//! Configuration error type.

use thiserror::Error;

/// Errors detected while loading or validating a model configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or serialization error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value violates a constraint
    #[error("Invalid value for '{key}': {value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    /// Create an invalid-value error.
    pub fn invalid(
        key: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
