//! Stage names, pipeline phases and generation provenance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four content stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Categorized question generation.
    Questions,
    /// Batched answer generation.
    Answers,
    /// Competitor synthesis and comparison.
    Comparison,
    /// Product page copy.
    PageContent,
}

impl StageName {
    /// All stages in pipeline order.
    pub const ALL: [Self; 4] = [
        Self::Questions,
        Self::Answers,
        Self::Comparison,
        Self::PageContent,
    ];

    /// Returns the snake_case identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Questions => "questions",
            Self::Answers => "answers",
            Self::Comparison => "comparison",
            Self::PageContent => "page_content",
        }
    }

    /// The pipeline phase in which this stage runs.
    #[must_use]
    pub fn phase(&self) -> PipelinePhase {
        match self {
            Self::Questions => PipelinePhase::Questions,
            Self::Answers => PipelinePhase::Answers,
            Self::Comparison => PipelinePhase::Comparison,
            Self::PageContent => PipelinePhase::PageContent,
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the orchestrator for one run.
///
/// `Completed` and `Failed` are terminal. Every other phase has exactly one
/// successor; no phase is ever skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    /// Building the product record.
    #[default]
    Parsing,
    /// Running the question stage.
    Questions,
    /// Running the answer stage.
    Answers,
    /// Running the comparison stage.
    Comparison,
    /// Running the page content stage.
    PageContent,
    /// Assembling the output documents.
    Assembling,
    /// Run finished with three documents.
    Completed,
    /// Run aborted.
    Failed,
}

impl PipelinePhase {
    /// Returns the next phase on the success path, or `None` for terminal phases.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Parsing => Some(Self::Questions),
            Self::Questions => Some(Self::Answers),
            Self::Answers => Some(Self::Comparison),
            Self::Comparison => Some(Self::PageContent),
            Self::PageContent => Some(Self::Assembling),
            Self::Assembling => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    /// Returns true if the phase is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsing => write!(f, "parsing"),
            Self::Questions => write!(f, "questions"),
            Self::Answers => write!(f, "answers"),
            Self::Comparison => write!(f, "comparison"),
            Self::PageContent => write!(f, "page_content"),
            Self::Assembling => write!(f, "assembling"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Which generator produced a stage artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    /// The external generator, accepted by the stage validator.
    Primary,
    /// The deterministic local fallback.
    Fallback,
}

impl GenerationMethod {
    /// Returns the lowercase identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
