//! The pipeline orchestrator.
//!
//! A run walks the phases `parsing → questions → answers → comparison →
//! page_content → assembling → completed` and either returns all three
//! documents or a [`PipelineFailure`] naming the phase that broke. Nothing
//! partial ever leaves a failed run.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::executor::StageExecutor;
use super::state::PipelineState;
use crate::config::PipelineConfig;
use crate::core::{GenerationMethod, PipelinePhase, StageName};
use crate::errors::ContentflowError;
use crate::pages::{self, ComparisonPage, FaqPage, Page, ProductPage, Provenance};
use crate::providers::Generator;
use crate::record::{RawRecord, RecordBuilder};
use crate::stages::{
    AnswerInput, AnswerStage, ComparisonStage, ContentStage, PageContentStage, QuestionStage,
    StageRecord,
};

/// Audit trail of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Run identifier.
    pub run_id: Uuid,
    /// Hash of the raw input record.
    pub input_fingerprint: String,
    /// Product name, once the record was built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Phase the run ended in.
    pub final_phase: PipelinePhase,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run ended.
    pub finished_at: DateTime<Utc>,
    /// Stage records in execution order.
    pub stages: Vec<StageRecord>,
}

impl RunMetadata {
    /// Stages whose artifact came from the fallback.
    #[must_use]
    pub fn fallback_stages(&self) -> Vec<StageName> {
        self.stages
            .iter()
            .filter(|r| r.metadata.generation_method == Some(GenerationMethod::Fallback))
            .map(|r| r.stage)
            .collect()
    }

    /// Returns the run duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// A completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    /// Documents keyed by `faq`, `product_page` and `comparison_page`.
    pub documents: BTreeMap<String, Page>,
    /// Run audit trail.
    pub metadata: RunMetadata,
}

impl PipelineRun {
    /// The FAQ document.
    #[must_use]
    pub fn faq(&self) -> Option<&FaqPage> {
        match self.documents.get(pages::FAQ_KEY) {
            Some(Page::Faq(page)) => Some(page),
            _ => None,
        }
    }

    /// The product page document.
    #[must_use]
    pub fn product_page(&self) -> Option<&ProductPage> {
        match self.documents.get(pages::PRODUCT_PAGE_KEY) {
            Some(Page::Product(page)) => Some(page),
            _ => None,
        }
    }

    /// The comparison page document.
    #[must_use]
    pub fn comparison_page(&self) -> Option<&ComparisonPage> {
        match self.documents.get(pages::COMPARISON_PAGE_KEY) {
            Some(Page::Comparison(page)) => Some(page),
            _ => None,
        }
    }
}

/// A run that stopped before producing its documents.
#[derive(Debug, Error)]
#[error("Pipeline failed during {phase}: {cause}")]
pub struct PipelineFailure {
    /// Phase in which the run failed.
    pub phase: PipelinePhase,
    /// Root cause.
    #[source]
    pub cause: ContentflowError,
    /// Audit trail up to the failure.
    pub metadata: Box<RunMetadata>,
}

/// Stable hash of a raw record.
///
/// Keys are sorted, so two records with the same fields always share a
/// fingerprint.
#[must_use]
pub fn input_fingerprint(raw: &RawRecord) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in raw {
        hasher.update(key.as_bytes());
        hasher.update([0x1f]);
        hasher.update(value.as_bytes());
        hasher.update([0x1e]);
    }
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}

/// Turns one raw product record into the three content documents.
///
/// A `Pipeline` holds no run state and can be shared between tasks behind an
/// [`Arc`]; each [`Pipeline::run`] owns its own [`PipelineState`].
pub struct Pipeline {
    config: PipelineConfig,
    record_builder: RecordBuilder,
    questions: QuestionStage,
    answers: AnswerStage,
    comparison: ComparisonStage,
    page_content: PageContentStage,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline whose stages share `generator`.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>, config: PipelineConfig) -> Self {
        let rules = &config.rules;
        Self {
            record_builder: RecordBuilder::new(),
            questions: QuestionStage::new(generator.clone(), rules.questions.clone()),
            answers: AnswerStage::new(generator.clone(), rules.answers.clone()),
            comparison: ComparisonStage::new(generator.clone(), rules.comparison.clone()),
            page_content: PageContentStage::new(generator, rules.page_content.clone()),
            config,
        }
    }

    /// Replaces the record builder.
    #[must_use]
    pub fn with_record_builder(mut self, builder: RecordBuilder) -> Self {
        self.record_builder = builder;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the pipeline for one raw record.
    #[instrument(skip_all, fields(run_id = tracing::field::Empty))]
    pub async fn run(&self, raw: &RawRecord) -> Result<PipelineRun, PipelineFailure> {
        let started_at = Utc::now();
        let mut state = PipelineState::new();
        tracing::Span::current().record("run_id", tracing::field::display(state.run_id));
        let fingerprint = input_fingerprint(raw);
        info!(fingerprint = %fingerprint, "Pipeline run started");

        let outcome = self.drive(&mut state, raw).await;
        let finish = |state: &mut PipelineState| RunMetadata {
            run_id: state.run_id,
            input_fingerprint: fingerprint.clone(),
            product_name: state.product.as_ref().map(|p| p.name.clone()),
            final_phase: state.phase(),
            started_at,
            finished_at: Utc::now(),
            stages: std::mem::take(&mut state.records),
        };

        match outcome {
            Ok(documents) => {
                let metadata = finish(&mut state);
                info!(
                    duration_ms = metadata.duration_ms(),
                    fallback_stages = ?metadata.fallback_stages(),
                    "Pipeline run completed"
                );
                Ok(PipelineRun {
                    documents,
                    metadata,
                })
            }
            Err(cause) => {
                let phase = state.fail();
                let metadata = finish(&mut state);
                error!(phase = %phase, error = %cause, "Pipeline run failed");
                Err(PipelineFailure {
                    phase,
                    cause,
                    metadata: Box::new(metadata),
                })
            }
        }
    }

    async fn drive(
        &self,
        state: &mut PipelineState,
        raw: &RawRecord,
    ) -> Result<BTreeMap<String, Page>, ContentflowError> {
        let product = Arc::new(self.record_builder.build(raw)?);
        state.product = Some(product.clone());
        enter_next_phase(state);

        let questions = Arc::new(self.run_stage(state, &self.questions, &product).await?);
        state.questions = Some(questions.clone());
        enter_next_phase(state);

        let answer_input = AnswerInput {
            product: product.clone(),
            questions: questions.clone(),
        };
        let answers = self.run_stage(state, &self.answers, &answer_input).await?;
        state.answers = Some(answers.clone());
        enter_next_phase(state);

        let comparison = self.run_stage(state, &self.comparison, &product).await?;
        state.comparison = Some(comparison.clone());
        enter_next_phase(state);

        let content = self.run_stage(state, &self.page_content, &product).await?;
        state.page_content = Some(content.clone());
        enter_next_phase(state);

        let faq_provenance = provenance(&state.records, &[StageName::Questions, StageName::Answers]);
        let page_provenance = provenance(&state.records, &[StageName::PageContent]);
        let comparison_provenance = provenance(&state.records, &[StageName::Comparison]);

        let documents: BTreeMap<String, Page> = [
            Page::Faq(pages::assemble_faq(&product, &questions, &answers, &faq_provenance)),
            Page::Product(pages::assemble_product_page(&product, &content, &page_provenance)),
            Page::Comparison(pages::assemble_comparison(&comparison, &comparison_provenance)),
        ]
        .into_iter()
        .map(|page| (page.document_key().to_string(), page))
        .collect();

        enter_next_phase(state);
        Ok(documents)
    }

    async fn run_stage<S>(
        &self,
        state: &mut PipelineState,
        stage: &S,
        input: &S::Input,
    ) -> Result<S::Artifact, ContentflowError>
    where
        S: ContentStage,
    {
        let executor = StageExecutor::new(self.config.retry.for_stage(stage.name()).clone());
        let (outcome, record) = executor.execute(stage, input).await.into_parts();
        info!(
            stage = %record.stage,
            attempts = record.metadata.attempts,
            fallback_used = record.metadata.fallback_used,
            "Stage finished"
        );
        state.record(record);
        outcome.map_err(ContentflowError::from)
    }
}

fn enter_next_phase(state: &mut PipelineState) {
    let from = state.phase();
    let to = state.advance();
    info!(from = %from, to = %to, "Phase transition");
}

fn provenance(records: &[StageRecord], stages: &[StageName]) -> Provenance {
    stages.iter().fold(Provenance::new(), |acc, stage| {
        match records
            .iter()
            .find(|r| r.stage == *stage)
            .and_then(|r| r.metadata.generation_method)
        {
            Some(method) => acc.with(*stage, method),
            None => acc,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{FallbackExhaustionError, GenerationError};
    use crate::testing::{offline_config, sample_raw_record, FailingGenerator};
    use crate::validators::Rejection;
    use async_trait::async_trait;

    /// A stage with no way to produce its artifact.
    struct DeadEndStage;

    #[async_trait]
    impl ContentStage for DeadEndStage {
        type Input = ();
        type Artifact = ();

        fn name(&self) -> StageName {
            StageName::Comparison
        }

        async fn primary(&self, _input: &()) -> Result<(), GenerationError> {
            Err(GenerationError::Request("connection refused".into()))
        }

        fn fallback(&self, _input: &()) -> Result<(), FallbackExhaustionError> {
            Err(FallbackExhaustionError::new("comparison", "no competitor available"))
        }

        fn validate(&self, _artifact: &(), _input: &()) -> Result<(), Rejection> {
            Ok(())
        }
    }

    #[test]
    fn test_fingerprint_is_stable_and_sensitive() {
        let raw = sample_raw_record();
        assert_eq!(input_fingerprint(&raw), input_fingerprint(&raw.clone()));
        assert_eq!(input_fingerprint(&raw).len(), 32);

        let mut changed = raw.clone();
        changed.insert("price".to_string(), "700".to_string());
        assert_ne!(input_fingerprint(&raw), input_fingerprint(&changed));
    }

    #[test]
    fn test_fingerprint_separates_fields() {
        let a: RawRecord = [("ab".to_string(), "c".to_string())].into_iter().collect();
        let b: RawRecord = [("a".to_string(), "bc".to_string())].into_iter().collect();
        assert_ne!(input_fingerprint(&a), input_fingerprint(&b));
    }

    #[tokio::test]
    async fn test_run_metadata_lists_fallback_stages() {
        let pipeline = Pipeline::new(Arc::new(FailingGenerator::new()), offline_config());
        let run = pipeline.run(&sample_raw_record()).await.unwrap();

        assert_eq!(run.metadata.final_phase, PipelinePhase::Completed);
        assert_eq!(run.metadata.fallback_stages(), StageName::ALL.to_vec());
        assert_eq!(
            run.metadata.product_name.as_deref(),
            Some("GlowBoost Vitamin C Serum")
        );
        assert!(run.metadata.duration_ms() >= 0);
    }

    #[tokio::test]
    async fn test_exhausted_fallback_is_recorded_and_propagated() {
        let pipeline = Pipeline::new(Arc::new(FailingGenerator::new()), offline_config());
        let mut state = PipelineState::new();

        let err = pipeline.run_stage(&mut state, &DeadEndStage, &()).await.unwrap_err();

        let ContentflowError::FallbackExhausted(cause) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(cause.stage, "comparison");
        assert_eq!(cause.message, "no competitor available");
        assert!(cause.primary_error.as_deref().unwrap().contains("connection refused"));

        assert_eq!(state.records.len(), 1);
        let record = &state.records[0];
        assert_eq!(record.stage, StageName::Comparison);
        assert!(!record.success);
        assert!(record.error.as_deref().unwrap().contains("no competitor available"));
    }

    #[test]
    fn test_provenance_follows_records() {
        let mut meta = crate::stages::StageMetadata::started();
        meta.generation_method = Some(GenerationMethod::Primary);
        let records = vec![StageRecord {
            stage: StageName::Questions,
            success: true,
            metadata: meta,
            error: None,
        }];
        let label = provenance(&records, &[StageName::Questions, StageName::Answers]).generated_by();
        assert!(label.ends_with("(questions=primary)"));
    }
}
