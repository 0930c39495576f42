//! Content stages.
//!
//! Each stage pairs a fallible primary generator with a deterministic local
//! fallback and the validator that gates the primary output. Stages hold no
//! run state; everything they need arrives through their input.

mod answers;
mod comparison;
mod page_content;
mod questions;
mod result;

pub use answers::{AnswerInput, AnswerStage};
pub use comparison::ComparisonStage;
pub use page_content::PageContentStage;
pub use questions::QuestionStage;
pub use result::{StageMetadata, StageRecord, StageResult};

use async_trait::async_trait;

use crate::core::StageName;
use crate::errors::{FallbackExhaustionError, GenerationError};
use crate::validators::Rejection;

/// A content generation step.
#[async_trait]
pub trait ContentStage: Send + Sync {
    /// What the stage reads.
    type Input: Send + Sync;
    /// What the stage produces.
    type Artifact: Send;

    /// Returns the stage name.
    fn name(&self) -> StageName;

    /// Asks the external generator for the artifact.
    async fn primary(&self, input: &Self::Input) -> Result<Self::Artifact, GenerationError>;

    /// Builds the artifact locally.
    fn fallback(&self, input: &Self::Input) -> Result<Self::Artifact, FallbackExhaustionError>;

    /// Accepts or rejects a primary artifact.
    fn validate(&self, artifact: &Self::Artifact, input: &Self::Input) -> Result<(), Rejection>;
}

/// Pads `text` with `filler` sentences until it reaches `min_chars`.
pub(crate) fn pad_to(mut text: String, min_chars: usize, filler: &str) -> String {
    if filler.trim().is_empty() {
        return text;
    }
    while text.trim().chars().count() < min_chars {
        if !text.is_empty() && !text.ends_with(' ') {
            text.push(' ');
        }
        text.push_str(filler.trim());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_to() {
        assert_eq!(pad_to("Long enough already".into(), 5, "x"), "Long enough already");
        let padded = pad_to("Short.".into(), 20, "More detail.");
        assert_eq!(padded, "Short. More detail. More detail.");
        assert!(padded.chars().count() >= 20);
        assert_eq!(pad_to(String::new(), 3, "abc"), "abc");
        assert_eq!(pad_to("a".into(), 10, "  "), "a");
    }
}
