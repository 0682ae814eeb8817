//! Error types for the ratinglens analysis service
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation.

use thiserror::Error;

/// Main error type for ratinglens operations
#[derive(Error, Debug)]
pub enum RatinglensError {
    /// Spreadsheet fetch failed (unreachable, auth, empty, or tab not found)
    #[error("Sheet fetch error: {0}")]
    Fetch(String),

    /// Required columns absent from the fetched sheet
    #[error("Schema error: {0}")]
    Schema(String),

    /// Completion API request failed
    #[error("Completion API error: {0}")]
    Completion(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for ratinglens operations
pub type Result<T> = std::result::Result<T, RatinglensError>;

/// Convert anyhow::Error to RatinglensError
impl From<anyhow::Error> for RatinglensError {
    fn from(err: anyhow::Error) -> Self {
        RatinglensError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RatinglensError::Fetch("no data found in tab 'Sheet1'".to_string());
        assert_eq!(
            err.to_string(),
            "Sheet fetch error: no data found in tab 'Sheet1'"
        );
    }

    #[test]
    fn test_schema_error_display() {
        let err = RatinglensError::Schema("missing required columns: Instructor".to_string());
        assert_eq!(
            err.to_string(),
            "Schema error: missing required columns: Instructor"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let config_err = config::ConfigError::Message("GOOGLE_SHEET_ID not set".to_string());
        let err: RatinglensError = config_err.into();
        assert!(matches!(err, RatinglensError::Config(_)));
    }
}
