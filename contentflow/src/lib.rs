//! # Contentflow
//!
//! Turns one structured product record into three JSON content pages: an
//! FAQ, a product description page and a comparison against a competitor.
//!
//! Every content stage asks an external text generator first and falls back
//! to a deterministic local builder when the generator fails or its output
//! does not pass validation:
//!
//! - **Record building**: raw string fields become a validated [`models::Product`]
//! - **Validation gates**: explicit rule sets for every stage artifact
//! - **Retry with backoff**: per-stage exponential backoff around generator calls
//! - **Fallbacks**: template questions, keyword answers, a synthesized competitor
//! - **Provenance**: every document records which stages used their fallback
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use contentflow::prelude::*;
//! use std::sync::Arc;
//!
//! let pipeline = Pipeline::new(Arc::new(DisabledGenerator), PipelineConfig::default());
//! let run = pipeline.run(&raw_record).await?;
//! write_documents(Path::new("output"), &run.documents, true)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod logging;
pub mod models;
pub mod output;
pub mod pages;
pub mod pipeline;
pub mod providers;
pub mod record;
pub mod stages;
pub mod testing;
pub mod validators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{OutputConfig, PipelineConfig, StagePolicies};
    pub use crate::core::{GenerationMethod, PipelinePhase, StageName};
    pub use crate::errors::{
        ContentflowError, FallbackExhaustionError, GenerationError, ValidationError,
    };
    pub use crate::logging::{init_logging, LogFormat, LoggingConfig};
    pub use crate::models::{
        AnswerSet, ComparisonResult, PageContent, Product, QuestionSet,
    };
    pub use crate::output::{write_documents, write_run_metadata};
    pub use crate::pages::Page;
    pub use crate::pipeline::{
        JitterStrategy, Pipeline, PipelineFailure, PipelineRun, RetryPolicy, RunMetadata,
        StageExecutor,
    };
    #[cfg(feature = "http")]
    pub use crate::providers::ChatCompletionsGenerator;
    pub use crate::providers::{DisabledGenerator, GenerationRequest, Generator, ProviderConfig};
    pub use crate::record::{RawRecord, RecordBuilder};
    pub use crate::stages::{ContentStage, StageRecord, StageResult};
    pub use crate::validators::{Rejection, ValidationRules, Validator};
}
