//! Error types for the contentflow pipeline.
//!
//! Three families matter to a run:
//!
//! - [`ValidationError`]: the raw record is malformed. Fatal, never retried.
//! - [`GenerationError`]: the external generator failed or returned text that
//!   could not be parsed. Absorbed by the stage executor, retried, then
//!   replaced by the stage fallback.
//! - [`FallbackExhaustionError`]: the local fallback could not produce an
//!   artifact. Fatal for the stage and therefore for the run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for contentflow operations.
#[derive(Debug, Error)]
pub enum ContentflowError {
    /// The input record failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The external generator failed.
    #[error("{0}")]
    Generation(#[from] GenerationError),

    /// A stage fallback failed.
    #[error("{0}")]
    FallbackExhausted(#[from] FallbackExhaustionError),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ContentflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Error raised when a raw product record cannot become a [`crate::models::Product`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Invalid field '{field}': {message}")]
pub struct ValidationError {
    /// The offending input field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// A required field is absent or blank.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "required field is missing or empty")
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("field".to_string(), serde_json::Value::String(self.field.clone()));
        map.insert(
            "message".to_string(),
            serde_json::Value::String(self.message.clone()),
        );
        map
    }
}

/// Failure of a single call to the external generator.
///
/// Every variant counts as one failed attempt for the stage executor.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum GenerationError {
    /// The request could not be sent or the server answered with an error.
    #[error("Generation request failed: {0}")]
    Request(String),

    /// The request timed out.
    #[error("Generation request timed out: {0}")]
    Timeout(String),

    /// The provider rejected the request because of quota or rate limits.
    #[error("Generation rate limited: {0}")]
    RateLimited(String),

    /// The provider rejected the credentials.
    #[error("Generation authentication failed: {0}")]
    Auth(String),

    /// The response could not be parsed into the stage artifact.
    #[error("Generation output could not be parsed: {0}")]
    Parse(String),

    /// No generator is configured for this run.
    #[error("Generator unavailable: {0}")]
    Unavailable(String),
}

impl GenerationError {
    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a request error.
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    /// Returns a short machine-readable kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Timeout(_) => "timeout",
            Self::RateLimited(_) => "rate_limited",
            Self::Auth(_) => "auth",
            Self::Parse(_) => "parse",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Error raised when a stage fallback cannot produce its artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Fallback for stage '{stage}' failed: {message}")]
pub struct FallbackExhaustionError {
    /// The stage whose fallback failed.
    pub stage: String,
    /// Why the fallback gave up.
    pub message: String,
    /// The last primary error seen before falling back, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_error: Option<String>,
}

impl FallbackExhaustionError {
    /// Creates a new fallback exhaustion error.
    #[must_use]
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            primary_error: None,
        }
    }

    /// Attaches the primary error that triggered the fallback.
    #[must_use]
    pub fn with_primary_error(mut self, error: impl Into<String>) -> Self {
        self.primary_error = Some(error.into());
        self
    }
}

/// Result type alias for contentflow operations.
pub type Result<T> = std::result::Result<T, ContentflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::missing("product_name");
        assert_eq!(err.field, "product_name");
        assert!(err.to_string().contains("product_name"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_validation_error_to_dict() {
        let dict = ValidationError::new("price", "bad").to_dict();
        assert_eq!(dict.get("field"), Some(&serde_json::json!("price")));
        assert_eq!(dict.get("message"), Some(&serde_json::json!("bad")));
    }

    #[test]
    fn test_generation_error_kind() {
        assert_eq!(GenerationError::parse("x").kind(), "parse");
        assert_eq!(GenerationError::Timeout("t".into()).kind(), "timeout");
        assert_eq!(GenerationError::RateLimited("r".into()).kind(), "rate_limited");
    }

    #[test]
    fn test_generation_error_serialization() {
        let err = GenerationError::Auth("401".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "auth", "message": "401"}));

        let back: GenerationError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_fallback_error_display() {
        let err = FallbackExhaustionError::new("comparison", "no ingredients")
            .with_primary_error("timeout");
        assert!(err.to_string().contains("comparison"));
        assert_eq!(err.primary_error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_contentflow_error_from() {
        let err: ContentflowError = ValidationError::missing("product_name").into();
        assert!(matches!(err, ContentflowError::Validation(_)));

        let err: ContentflowError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ContentflowError::Serialization(_)));
    }
}
