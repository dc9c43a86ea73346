use thiserror::Error;

use crate::filter::FilterError;

/// Application-wide error types for Melkor.
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream provider call failed (network, auth, throttling).
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// A crawl was abandoned because its cancellation token fired.
    #[error("Crawl cancelled")]
    Cancelled,

    /// Malformed `_filter` expression.
    #[error(transparent)]
    FilterSyntax(#[from] FilterError),

    /// Non-numeric `_limit` parameter.
    #[error("Bad limit parameter")]
    LimitParse(String),

    /// Unknown resource kind or unknown identifier.
    #[error("Not Found")]
    NotFound,

    /// Two crawlers registered under the same canonical name.
    #[error("Resource already registered: {0}")]
    DuplicateResource(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AppError {
    /// Returns true if the error was caused by malformed client input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::FilterSyntax(_) | AppError::LimitParse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(AppError::LimitParse("one".into()).is_client_error());
        assert!(AppError::FilterSyntax(FilterError::MissingParentheses).is_client_error());
        assert!(!AppError::NotFound.is_client_error());
        assert!(!AppError::ProviderError("throttled".into()).is_client_error());
    }

    #[test]
    fn test_filter_error_message_is_passed_through() {
        let err = AppError::from(FilterError::ColonCount);
        assert_eq!(
            err.to_string(),
            "invalid format of filter, only one ':' allowed"
        );
    }
}
