//! Pipeline configuration.
//!
//! Every field has a serde default, so a config file only needs the values
//! it changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::StageName;
use crate::errors::ContentflowError;
use crate::logging::LoggingConfig;
use crate::pipeline::RetryPolicy;
use crate::providers::ProviderConfig;
use crate::validators::ValidationRules;

/// Retry policy per stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagePolicies {
    /// Question stage.
    #[serde(default)]
    pub questions: RetryPolicy,
    /// Answer stage.
    #[serde(default)]
    pub answers: RetryPolicy,
    /// Comparison stage.
    #[serde(default)]
    pub comparison: RetryPolicy,
    /// Page content stage.
    #[serde(default)]
    pub page_content: RetryPolicy,
}

impl StagePolicies {
    /// The same policy for every stage.
    #[must_use]
    pub fn uniform(policy: &RetryPolicy) -> Self {
        Self {
            questions: policy.clone(),
            answers: policy.clone(),
            comparison: policy.clone(),
            page_content: policy.clone(),
        }
    }

    /// Returns the policy for a stage.
    #[must_use]
    pub fn for_stage(&self, stage: StageName) -> &RetryPolicy {
        match stage {
            StageName::Questions => &self.questions,
            StageName::Answers => &self.answers,
            StageName::Comparison => &self.comparison,
            StageName::PageContent => &self.page_content,
        }
    }
}

/// Where and how documents are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory.
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// Pretty-print JSON.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    /// Also write `run_metadata.json`.
    #[serde(default)]
    pub write_metadata: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_pretty() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            pretty: default_pretty(),
            write_metadata: false,
        }
    }
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Retry policies.
    #[serde(default)]
    pub retry: StagePolicies,
    /// Validation rules.
    #[serde(default)]
    pub rules: ValidationRules,
    /// External generator settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ContentflowError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ContentflowError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            ContentflowError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Uses one retry policy for every stage.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = StagePolicies::uniform(&policy);
        self
    }

    /// Sets the validation rules.
    #[must_use]
    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Rejects impossible settings.
    pub fn validate(&self) -> Result<(), ContentflowError> {
        for stage in StageName::ALL {
            self.retry
                .for_stage(stage)
                .validate()
                .map_err(|e| ContentflowError::Config(format!("retry.{stage}: {e}")))?;
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ContentflowError::Config(format!(
                "provider.temperature must be within 0.0..=2.0, got {}",
                self.provider.temperature
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ContentflowError::Config(
                "provider.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.for_stage(StageName::Answers).max_retries, 3);
        assert_eq!(config.output.directory, PathBuf::from("output"));
    }

    #[test]
    fn test_with_retry_policy_applies_to_all_stages() {
        let config = PipelineConfig::new().with_retry_policy(RetryPolicy::immediate());
        for stage in StageName::ALL {
            assert_eq!(config.retry.for_stage(stage).max_attempts(), 1);
        }
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"retry": {{"answers": {{"max_retries": 1}}}}, "output": {{"pretty": false}}}}"#
        )
        .unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.retry.answers.max_retries, 1);
        assert_eq!(config.retry.questions.max_retries, 3);
        assert!(!config.output.pretty);
        assert_eq!(config.provider.model, "llama-3.1-8b-instant");
    }

    #[test]
    fn test_from_file_rejects_bad_policy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"retry": {{"questions": {{"exponential_base": 0.5}}}}}}"#).unwrap();

        let err = PipelineConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("retry.questions"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = PipelineConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ContentflowError::Config(_)));
    }

    #[test]
    fn test_validate_temperature() {
        let mut config = PipelineConfig::default();
        config.provider.temperature = 3.5;
        assert!(config.validate().is_err());
    }
}
