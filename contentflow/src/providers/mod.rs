//! External text generator boundary.
//!
//! Stages never talk to a network client directly. They build a
//! [`GenerationRequest`], hand it to a [`Generator`] and parse the returned
//! text. Parse failures surface as [`GenerationError::Parse`] so the executor
//! retries them like any other failure.

#[cfg(feature = "http")]
mod http;
pub mod parse;
pub mod prompts;

#[cfg(feature = "http")]
pub use http::ChatCompletionsGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::StageName;
use crate::errors::GenerationError;

/// A single prompt for the external generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The stage issuing the request.
    pub stage: StageName,
    /// System instructions.
    pub system: String,
    /// User message.
    pub user: String,
}

impl GenerationRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(stage: StageName, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            stage,
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Produces raw text for a prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generates a completion for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// A generator for offline runs; every call fails so stages fall back.
#[derive(Debug, Clone, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl Generator for DisabledGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable(format!(
            "generation disabled for stage {}",
            request.stage
        )))
    }
}

/// Connection settings for the chat completions generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// When false every stage uses its fallback.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_enabled() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
            enabled: default_enabled(),
        }
    }
}

impl ProviderConfig {
    /// Reads the API key from the configured environment variable.
    ///
    /// Blank values count as missing.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_generator_fails() {
        let request = GenerationRequest::new(StageName::Questions, "s", "u");
        let err = DisabledGenerator.generate(&request).await.unwrap_err();
        assert_eq!(err.kind(), "unavailable");
        assert!(err.to_string().contains("questions"));
    }

    #[tokio::test]
    async fn test_mock_generator() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|req| Ok(format!("echo {}", req.stage)));

        let request = GenerationRequest::new(StageName::Answers, "s", "u");
        assert_eq!(mock.generate(&request).await.unwrap(), "echo answers");
    }

    #[test]
    fn test_provider_config_defaults() {
        let config: ProviderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.api_key_env, "GROQ_API_KEY");
        assert!(config.enabled);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_api_key_missing_variable() {
        let config = ProviderConfig {
            api_key_env: "CONTENTFLOW_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..ProviderConfig::default()
        };
        assert!(config.api_key().is_none());
    }
}
