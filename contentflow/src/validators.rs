//! Acceptance gates for generated artifacts.
//!
//! A validator is a pure predicate over an artifact and its stage context.
//! An invalid artifact is an expected outcome, not an error: validators
//! return a [`Rejection`] describing the first broken rule and never panic.
//! Rules live in plain config structs so tests and deployments can tighten or
//! relax them without touching the validators.

use crate::models::{AnswerSet, ComparisonResult, PageContent, QuestionSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Why an artifact was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Short rule identifier, e.g. "min_questions".
    pub rule: &'static str,
    /// Human-readable explanation.
    pub message: String,
}

impl Rejection {
    /// Creates a new rejection.
    #[must_use]
    pub fn new(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)
    }
}

/// A stage acceptance predicate.
pub trait Validator {
    /// The artifact being judged.
    type Artifact;
    /// Read-only context the rules may need.
    type Context: ?Sized;

    /// Returns `Ok(())` if the artifact is acceptable.
    fn check(&self, artifact: &Self::Artifact, ctx: &Self::Context) -> Result<(), Rejection>;

    /// Boolean form of [`Validator::check`].
    fn is_valid(&self, artifact: &Self::Artifact, ctx: &Self::Context) -> bool {
        self.check(artifact, ctx).is_ok()
    }
}

/// Rules for all four stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Question stage rules.
    #[serde(default)]
    pub questions: QuestionRules,
    /// Answer stage rules.
    #[serde(default)]
    pub answers: AnswerRules,
    /// Comparison stage rules.
    #[serde(default)]
    pub comparison: ComparisonRules,
    /// Page content stage rules.
    #[serde(default)]
    pub page_content: PageContentRules,
}

/// Question stage rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRules {
    /// Minimum number of questions.
    #[serde(default = "default_min_questions")]
    pub min_questions: usize,
    /// Categories that must each appear at least once.
    #[serde(default = "default_required_categories")]
    pub required_categories: Vec<String>,
}

fn default_min_questions() -> usize {
    15
}

fn default_required_categories() -> Vec<String> {
    vec![
        "Informational".to_string(),
        "Usage".to_string(),
        "Safety".to_string(),
    ]
}

impl Default for QuestionRules {
    fn default() -> Self {
        Self {
            min_questions: default_min_questions(),
            required_categories: default_required_categories(),
        }
    }
}

/// Answer stage rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRules {
    /// Minimum trimmed length of each answer, in characters.
    #[serde(default = "default_min_answer_chars")]
    pub min_answer_chars: usize,
}

fn default_min_answer_chars() -> usize {
    20
}

impl Default for AnswerRules {
    fn default() -> Self {
        Self {
            min_answer_chars: default_min_answer_chars(),
        }
    }
}

/// Comparison stage rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRules {
    /// Minimum number of comparison points.
    #[serde(default = "default_min_points")]
    pub min_points: usize,
}

fn default_min_points() -> usize {
    5
}

impl Default for ComparisonRules {
    fn default() -> Self {
        Self {
            min_points: default_min_points(),
        }
    }
}

/// Page content stage rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContentRules {
    /// Minimum tagline length in characters.
    #[serde(default = "default_min_tagline_chars")]
    pub min_tagline_chars: usize,
    /// Minimum description length in characters.
    #[serde(default = "default_min_description_chars")]
    pub min_description_chars: usize,
    /// Minimum number of feature bullets.
    #[serde(default = "default_min_key_features")]
    pub min_key_features: usize,
    /// Minimum number of precautions.
    #[serde(default = "default_min_precautions")]
    pub min_precautions: usize,
}

fn default_min_tagline_chars() -> usize {
    10
}

fn default_min_description_chars() -> usize {
    50
}

fn default_min_key_features() -> usize {
    3
}

fn default_min_precautions() -> usize {
    2
}

impl Default for PageContentRules {
    fn default() -> Self {
        Self {
            min_tagline_chars: default_min_tagline_chars(),
            min_description_chars: default_min_description_chars(),
            min_key_features: default_min_key_features(),
            min_precautions: default_min_precautions(),
        }
    }
}

fn char_len(s: &str) -> usize {
    s.trim().chars().count()
}

/// Validates a [`QuestionSet`].
#[derive(Debug, Clone, Default)]
pub struct QuestionValidator {
    rules: QuestionRules,
}

impl QuestionValidator {
    /// Creates a validator with the given rules.
    #[must_use]
    pub fn new(rules: QuestionRules) -> Self {
        Self { rules }
    }
}

impl Validator for QuestionValidator {
    type Artifact = QuestionSet;
    type Context = ();

    fn check(&self, set: &QuestionSet, _ctx: &()) -> Result<(), Rejection> {
        if set.len() < self.rules.min_questions {
            return Err(Rejection::new(
                "min_questions",
                format!(
                    "{} questions generated, at least {} required",
                    set.len(),
                    self.rules.min_questions
                ),
            ));
        }

        // Categories are checked against the questions, not the declared list.
        let observed = QuestionSet::new(set.questions.clone());
        for required in &self.rules.required_categories {
            if !observed.has_category(required) {
                return Err(Rejection::new(
                    "required_category",
                    format!("no question in required category '{required}'"),
                ));
            }
        }

        let mut seen = HashSet::new();
        for (i, q) in set.questions.iter().enumerate() {
            let text = q.question.trim();
            if !text.ends_with('?') {
                return Err(Rejection::new(
                    "question_mark",
                    format!("question {} does not end with '?': {text}", i + 1),
                ));
            }
            if !seen.insert(text.to_lowercase()) {
                return Err(Rejection::new(
                    "duplicate_question",
                    format!("question {} duplicates an earlier one: {text}", i + 1),
                ));
            }
        }
        Ok(())
    }
}

/// Validates an [`AnswerSet`] against the questions it answers.
#[derive(Debug, Clone, Default)]
pub struct AnswerValidator {
    rules: AnswerRules,
}

impl AnswerValidator {
    /// Creates a validator with the given rules.
    #[must_use]
    pub fn new(rules: AnswerRules) -> Self {
        Self { rules }
    }
}

impl Validator for AnswerValidator {
    type Artifact = AnswerSet;
    type Context = QuestionSet;

    fn check(&self, answers: &AnswerSet, questions: &QuestionSet) -> Result<(), Rejection> {
        if answers.len() != questions.len() {
            return Err(Rejection::new(
                "answer_count",
                format!(
                    "{} answers for {} questions",
                    answers.len(),
                    questions.len()
                ),
            ));
        }
        for (i, answer) in answers.answers.iter().enumerate() {
            if answer.text.trim().is_empty() {
                return Err(Rejection::new("empty_answer", format!("answer {} is empty", i + 1)));
            }
            if char_len(&answer.text) < self.rules.min_answer_chars {
                return Err(Rejection::new(
                    "min_answer_chars",
                    format!(
                        "answer {} has fewer than {} characters",
                        i + 1,
                        self.rules.min_answer_chars
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Validates a [`ComparisonResult`].
#[derive(Debug, Clone, Default)]
pub struct ComparisonValidator {
    rules: ComparisonRules,
}

impl ComparisonValidator {
    /// Creates a validator with the given rules.
    #[must_use]
    pub fn new(rules: ComparisonRules) -> Self {
        Self { rules }
    }
}

impl Validator for ComparisonValidator {
    type Artifact = ComparisonResult;
    type Context = ();

    fn check(&self, result: &ComparisonResult, _ctx: &()) -> Result<(), Rejection> {
        if result.product_a.name.trim().is_empty() {
            return Err(Rejection::new("product_a", "product_a has no name"));
        }
        if result.summary.is_empty() {
            return Err(Rejection::new("summary", "summary is empty"));
        }
        if result.recommendation.trim().is_empty() {
            return Err(Rejection::new("recommendation", "recommendation is empty"));
        }
        if result.comparison_points.len() < self.rules.min_points {
            return Err(Rejection::new(
                "min_points",
                format!(
                    "only {} comparison points (minimum {})",
                    result.comparison_points.len(),
                    self.rules.min_points
                ),
            ));
        }
        let competitor = result.product_b.name.trim();
        if competitor.is_empty() {
            return Err(Rejection::new("competitor_name", "competitor has no name"));
        }
        if competitor.eq_ignore_ascii_case(result.product_a.name.trim()) {
            return Err(Rejection::new(
                "competitor_name",
                "competitor has the same name as the product",
            ));
        }
        let (a, b) = (&result.product_a, &result.product_b);
        if same_text(a.concentration_text(), b.concentration_text())
            && same_text(&a.price, &b.price)
        {
            return Err(Rejection::new(
                "competitor_distinct",
                "competitor matches the product in both concentration and price",
            ));
        }
        Ok(())
    }
}

/// Validates [`PageContent`].
#[derive(Debug, Clone, Default)]
pub struct PageContentValidator {
    rules: PageContentRules,
}

impl PageContentValidator {
    /// Creates a validator with the given rules.
    #[must_use]
    pub fn new(rules: PageContentRules) -> Self {
        Self { rules }
    }
}

impl Validator for PageContentValidator {
    type Artifact = PageContent;
    type Context = ();

    fn check(&self, content: &PageContent, _ctx: &()) -> Result<(), Rejection> {
        let r = &self.rules;
        if char_len(&content.tagline) < r.min_tagline_chars {
            return Err(Rejection::new("tagline", "tagline too short"));
        }
        if char_len(&content.description) < r.min_description_chars {
            return Err(Rejection::new("description", "description too short"));
        }
        if content.key_features.len() < r.min_key_features {
            return Err(Rejection::new(
                "key_features",
                format!("need at least {} key features", r.min_key_features),
            ));
        }
        if content.precautions.len() < r.min_precautions {
            return Err(Rejection::new(
                "precautions",
                format!("need at least {} precautions", r.min_precautions),
            ));
        }
        Ok(())
    }
}
