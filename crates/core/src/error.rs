//! Error types for Meridian.
//!
//! A single error enum covers configuration, provider, retrieval and
//! synthesis failures. Only [`AppError::Config`] is fatal for a query; the
//! retrieval layers recover from everything else locally.

use thiserror::Error;

/// Unified error type for Meridian.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic: errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors: bad settings, missing credentials,
    /// embedding dimension mismatches.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An external provider (web search, language model) did not answer in time
    #[error("Provider timeout: {0}")]
    Timeout(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Web search provider errors
    #[error("Web search error: {0}")]
    Web(String),

    /// Knowledge base, embedding and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error must abort the current query instead of degrading.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_))
    }

    /// Whether this error came from a provider timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Timeout(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_errors_are_fatal() {
        assert!(AppError::Config("dimension mismatch".to_string()).is_fatal());
        assert!(!AppError::Timeout("web".to_string()).is_fatal());
        assert!(!AppError::Llm("down".to_string()).is_fatal());
        assert!(!AppError::Cancelled.is_fatal());
    }

    #[test]
    fn test_timeout_detection() {
        assert!(AppError::Timeout("router".to_string()).is_timeout());
        assert!(!AppError::Web("429".to_string()).is_timeout());
    }

    #[test]
    fn test_serde_json_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Serialization(_)));
    }
}
