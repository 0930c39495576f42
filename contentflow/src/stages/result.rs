//! Stage results and execution metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{GenerationMethod, StageName};
use crate::errors::FallbackExhaustionError;

/// How a stage arrived at its artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMetadata {
    /// Which generator produced the artifact. `None` when nothing did.
    pub generation_method: Option<GenerationMethod>,
    /// Whether the fallback was invoked.
    pub fallback_used: bool,
    /// Primary attempts made.
    pub attempts: u32,
    /// Sleeps between attempts, in milliseconds.
    #[serde(default)]
    pub delays_ms: Vec<u64>,
    /// The last primary failure or rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// When the stage started.
    pub started_at: DateTime<Utc>,
    /// When the stage ended.
    pub ended_at: DateTime<Utc>,
}

impl StageMetadata {
    /// Creates metadata for a stage starting now.
    #[must_use]
    pub fn started() -> Self {
        let now = Utc::now();
        Self {
            generation_method: None,
            fallback_used: false,
            attempts: 0,
            delays_ms: Vec::new(),
            last_error: None,
            started_at: now,
            ended_at: now,
        }
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.ended_at - self.started_at).num_milliseconds()
    }
}

/// Outcome of one stage: the artifact (if any) plus metadata.
#[derive(Debug, Clone)]
pub struct StageResult<A> {
    /// The stage that ran.
    pub stage: StageName,
    /// True if an artifact was produced.
    pub success: bool,
    /// The artifact.
    pub artifact: Option<A>,
    /// Execution metadata.
    pub metadata: StageMetadata,
    /// Why the stage failed.
    pub error: Option<FallbackExhaustionError>,
}

impl<A> StageResult<A> {
    /// Creates a successful result.
    #[must_use]
    pub fn completed(stage: StageName, artifact: A, metadata: StageMetadata) -> Self {
        Self {
            stage,
            success: true,
            artifact: Some(artifact),
            metadata,
            error: None,
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub fn failed(stage: StageName, metadata: StageMetadata, error: FallbackExhaustionError) -> Self {
        Self {
            stage,
            success: false,
            artifact: None,
            metadata,
            error: Some(error),
        }
    }

    /// Returns true if the primary generator produced the artifact.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.metadata.generation_method == Some(GenerationMethod::Primary)
    }

    /// Splits the result into the outcome and a serializable record.
    pub fn into_parts(self) -> (Result<A, FallbackExhaustionError>, StageRecord) {
        let record = StageRecord {
            stage: self.stage,
            success: self.success,
            metadata: self.metadata,
            error: self.error.as_ref().map(ToString::to_string),
        };
        let outcome = match (self.artifact, self.error) {
            (Some(artifact), _) => Ok(artifact),
            (None, Some(err)) => Err(err),
            (None, None) => Err(FallbackExhaustionError::new(
                self.stage.as_str(),
                "stage produced no artifact",
            )),
        };
        (outcome, record)
    }
}

/// Serializable summary of a stage result, without the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// The stage that ran.
    pub stage: StageName,
    /// True if an artifact was produced.
    pub success: bool,
    /// Execution metadata.
    #[serde(flatten)]
    pub metadata: StageMetadata,
    /// Error message if the stage failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
