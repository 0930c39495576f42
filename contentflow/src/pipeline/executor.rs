//! Stage executor: retry, validate, fall back.
//!
//! The executor wraps one stage's primary generator in the retry policy,
//! gates every primary artifact through the stage validator and substitutes
//! the local fallback once the attempts are exhausted. A rejected artifact
//! costs an attempt exactly like a generator error.

use std::future::Future;

use chrono::Utc;
use tracing::{debug, warn};

use super::retry::RetryPolicy;
use crate::core::{GenerationMethod, StageName};
use crate::errors::{FallbackExhaustionError, GenerationError};
use crate::stages::{ContentStage, StageMetadata, StageResult};
use crate::validators::Rejection;

/// Runs stage operations under a [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct StageExecutor {
    policy: RetryPolicy,
}

impl StageExecutor {
    /// Creates an executor with the given policy.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs a [`ContentStage`] against its input.
    pub async fn execute<S>(&self, stage: &S, input: &S::Input) -> StageResult<S::Artifact>
    where
        S: ContentStage,
    {
        self.run(
            stage.name(),
            || stage.primary(input),
            || stage.fallback(input),
            |artifact| stage.validate(artifact, input),
        )
        .await
    }

    /// Runs `primary` until it yields an accepted artifact or the attempts run
    /// out, then calls `fallback` exactly once.
    ///
    /// The fallback artifact is not re-validated.
    pub async fn run<A, P, Fut, F, V>(
        &self,
        stage: StageName,
        mut primary: P,
        fallback: F,
        validate: V,
    ) -> StageResult<A>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = Result<A, GenerationError>>,
        F: FnOnce() -> Result<A, FallbackExhaustionError>,
        V: Fn(&A) -> Result<(), Rejection>,
    {
        let mut metadata = StageMetadata::started();
        let max_attempts = self.policy.max_attempts();

        for attempt in 1..=max_attempts {
            metadata.attempts = attempt;

            let failure = match primary().await {
                Ok(artifact) => match validate(&artifact) {
                    Ok(()) => {
                        debug!(stage = %stage, attempt, "Primary artifact accepted");
                        metadata.generation_method = Some(GenerationMethod::Primary);
                        metadata.ended_at = Utc::now();
                        return StageResult::completed(stage, artifact, metadata);
                    }
                    Err(rejection) => format!("rejected: {rejection}"),
                },
                Err(err) => err.to_string(),
            };

            warn!(
                stage = %stage,
                attempt,
                max_attempts,
                error = %failure,
                "Primary generation attempt failed"
            );
            metadata.last_error = Some(failure);

            if attempt < max_attempts {
                let delay = self.policy.delay_for(attempt);
                #[allow(clippy::cast_possible_truncation)]
                metadata.delays_ms.push(delay.as_millis() as u64);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        warn!(stage = %stage, attempts = metadata.attempts, "Using fallback generator");
        metadata.fallback_used = true;

        match fallback() {
            Ok(artifact) => {
                metadata.generation_method = Some(GenerationMethod::Fallback);
                metadata.ended_at = Utc::now();
                StageResult::completed(stage, artifact, metadata)
            }
            Err(mut err) => {
                if err.primary_error.is_none() {
                    if let Some(last) = &metadata.last_error {
                        err = err.with_primary_error(last.clone());
                    }
                }
                metadata.ended_at = Utc::now();
                StageResult::failed(stage, metadata, err)
            }
        }
    }
}
