//! Per-run pipeline state.

use std::sync::Arc;

use uuid::Uuid;

use crate::core::PipelinePhase;
use crate::models::{AnswerSet, ComparisonResult, PageContent, Product, QuestionSet};
use crate::stages::StageRecord;

/// Everything one run has produced so far.
///
/// Owned by a single [`super::Pipeline::run`] call; never shared between runs.
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Run identifier.
    pub run_id: Uuid,
    phase: PipelinePhase,
    /// The validated product.
    pub product: Option<Arc<Product>>,
    /// Questions stage artifact.
    pub questions: Option<Arc<QuestionSet>>,
    /// Answers stage artifact.
    pub answers: Option<AnswerSet>,
    /// Comparison stage artifact.
    pub comparison: Option<ComparisonResult>,
    /// Page content stage artifact.
    pub page_content: Option<PageContent>,
    /// Stage records in execution order.
    pub records: Vec<StageRecord>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineState {
    /// Creates a state in [`PipelinePhase::Parsing`] with a fresh run id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            phase: PipelinePhase::Parsing,
            product: None,
            questions: None,
            answers: None,
            comparison: None,
            page_content: None,
            records: Vec::new(),
        }
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    /// Moves to the next phase on the success path and returns it.
    ///
    /// Terminal phases stay where they are.
    pub fn advance(&mut self) -> PipelinePhase {
        if let Some(next) = self.phase.next() {
            self.phase = next;
        }
        self.phase
    }

    /// Marks the run as failed and returns the phase it failed in.
    pub fn fail(&mut self) -> PipelinePhase {
        let failed_in = self.phase;
        self.phase = PipelinePhase::Failed;
        failed_in
    }

    /// Appends a stage record.
    pub fn record(&mut self, record: StageRecord) {
        self.records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = PipelineState::new();
        assert_eq!(state.phase(), PipelinePhase::Parsing);
        assert!(state.product.is_none());
        assert!(state.records.is_empty());
        assert_ne!(state.run_id, PipelineState::new().run_id);
    }

    #[test]
    fn test_advance_walks_phases_in_order() {
        let mut state = PipelineState::new();
        let mut walked = vec![state.phase()];
        while !state.phase().is_terminal() {
            walked.push(state.advance());
        }
        assert_eq!(
            walked,
            vec![
                PipelinePhase::Parsing,
                PipelinePhase::Questions,
                PipelinePhase::Answers,
                PipelinePhase::Comparison,
                PipelinePhase::PageContent,
                PipelinePhase::Assembling,
                PipelinePhase::Completed,
            ]
        );
        assert_eq!(state.advance(), PipelinePhase::Completed);
    }

    #[test]
    fn test_fail_reports_origin_phase() {
        let mut state = PipelineState::new();
        state.advance();
        state.advance();
        assert_eq!(state.fail(), PipelinePhase::Answers);
        assert_eq!(state.phase(), PipelinePhase::Failed);
        assert_eq!(state.advance(), PipelinePhase::Failed);
    }
}
