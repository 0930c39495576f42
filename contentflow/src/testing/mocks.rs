//! Mock generators for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use crate::core::StageName;
use crate::errors::GenerationError;
use crate::providers::{GenerationRequest, Generator};

/// A generator that replays scripted responses per stage.
///
/// Once a stage's script runs out, further calls fail with
/// [`GenerationError::Unavailable`].
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    scripts: Mutex<HashMap<StageName, VecDeque<Result<String, GenerationError>>>>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    /// Creates a generator with no scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response for a stage.
    #[must_use]
    pub fn with_response(self, stage: StageName, body: impl Into<String>) -> Self {
        self.push(stage, Ok(body.into()));
        self
    }

    /// Queues a failure for a stage.
    #[must_use]
    pub fn with_error(self, stage: StageName, error: GenerationError) -> Self {
        self.push(stage, Err(error));
        self
    }

    /// Queues a response or failure.
    pub fn push(&self, stage: StageName, response: Result<String, GenerationError>) {
        self.scripts.lock().entry(stage).or_default().push_back(response);
    }

    /// Returns the number of calls for a stage.
    #[must_use]
    pub fn call_count(&self, stage: StageName) -> usize {
        self.calls.lock().iter().filter(|r| r.stage == stage).count()
    }

    /// Returns the total number of calls.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the recorded requests.
    #[must_use]
    pub fn recorded_requests(&self) -> Vec<GenerationRequest> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.lock().push(request.clone());
        self.scripts
            .lock()
            .get_mut(&request.stage)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(GenerationError::Unavailable(format!(
                    "no scripted response for {}",
                    request.stage
                )))
            })
    }
}

/// A generator that always fails.
#[derive(Debug)]
pub struct FailingGenerator {
    error: GenerationError,
    call_count: Mutex<usize>,
}

impl FailingGenerator {
    /// Creates a generator failing with a request error.
    #[must_use]
    pub fn new() -> Self {
        Self::with_error(GenerationError::request("connection refused"))
    }

    /// Creates a generator failing with the given error.
    #[must_use]
    pub fn with_error(error: GenerationError) -> Self {
        Self {
            error,
            call_count: Mutex::new(0),
        }
    }

    /// Returns the number of times the generator was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }
}

impl Default for FailingGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        *self.call_count.lock() += 1;
        Err(self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(stage: StageName) -> GenerationRequest {
        GenerationRequest::new(stage, "system", "user")
    }

    #[tokio::test]
    async fn test_scripted_generator_replays_in_order() {
        let gen = ScriptedGenerator::new()
            .with_error(StageName::Questions, GenerationError::Timeout("slow".into()))
            .with_response(StageName::Questions, "[]");

        assert!(gen.generate(&request(StageName::Questions)).await.is_err());
        assert_eq!(gen.generate(&request(StageName::Questions)).await.unwrap(), "[]");
        assert!(matches!(
            gen.generate(&request(StageName::Questions)).await,
            Err(GenerationError::Unavailable(_))
        ));
        assert_eq!(gen.call_count(StageName::Questions), 3);
        assert_eq!(gen.call_count(StageName::Answers), 0);
    }

    #[tokio::test]
    async fn test_failing_generator_counts_calls() {
        let gen = FailingGenerator::new();
        let _ = gen.generate(&request(StageName::Answers)).await;
        let _ = gen.generate(&request(StageName::Answers)).await;
        assert_eq!(gen.call_count(), 2);
    }
}
