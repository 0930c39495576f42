//! Testing utilities for contentflow pipelines.
//!
//! This module provides:
//! - Sample product records
//! - Scripted and failing generators
//! - Zero-delay pipeline configuration

mod fixtures;
mod mocks;

pub use fixtures::{offline_config, sample_product, sample_raw_record};
pub use mocks::{FailingGenerator, ScriptedGenerator};
