//! Core enums shared by every layer of the pipeline:
//! - Content stage names
//! - Pipeline phases (the orchestrator state machine)
//! - Generation method / provenance

mod status;

pub use status::{GenerationMethod, PipelinePhase, StageName};
