// src/error.rs
// Error types for the analysis pipeline

use thiserror::Error;

/// Main error type for the ai-comments library
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using AnalyzerError
pub type Result<T> = std::result::Result<T, AnalyzerError>;

impl AnalyzerError {
    /// Whether the failure came from the generative backend rather than the caller
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Http(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // Display formatting
    // ============================================================================

    #[test]
    fn test_invalid_input_error() {
        let err = AnalyzerError::InvalidInput("no changes".to_string());
        assert!(err.to_string().contains("invalid input"));
        assert!(err.to_string().contains("no changes"));
    }

    #[test]
    fn test_provider_error() {
        let err = AnalyzerError::Provider("rate limited".to_string());
        assert_eq!(err.to_string(), "provider error: rate limited");
        assert!(err.is_provider_failure());
    }

    #[test]
    fn test_config_error_is_not_provider_failure() {
        let err = AnalyzerError::Config("OPENAI_API_KEY not set".to_string());
        assert!(err.to_string().contains("configuration error"));
        assert!(!err.is_provider_failure());
    }

    // ============================================================================
    // Conversions
    // ============================================================================

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: AnalyzerError = json_err.into();
        assert!(matches!(err, AnalyzerError::Json(_)));
        assert!(err.to_string().starts_with("JSON serialization error"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AnalyzerError = io.into();
        assert!(matches!(err, AnalyzerError::Io(_)));
    }
}
