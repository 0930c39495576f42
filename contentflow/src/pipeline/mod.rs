//! Pipeline execution.
//!
//! This module provides:
//! - Retry policies with exponential backoff
//! - The stage executor (retry, validate, fall back)
//! - Per-run state
//! - The orchestrator driving the phase sequence

mod executor;
mod orchestrator;
mod retry;
mod state;


pub use executor::StageExecutor;
pub use orchestrator::{input_fingerprint, Pipeline, PipelineFailure, PipelineRun, RunMetadata};
pub use retry::{JitterStrategy, RetryPolicy};
pub use state::PipelineState;
