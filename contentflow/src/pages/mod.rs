//! Output documents.
//!
//! A run emits three pages, modelled as one enum tagged by `page_type` so a
//! serialized document always says what it is. Each variant has exactly one
//! assembly function.

pub mod blocks;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::{GenerationMethod, StageName};
use crate::models::{
    AnswerSet, ComparisonPoint, ComparisonResult, PageContent, Product, ProductSummary,
    QuestionSet,
};
use blocks::{Pricing, SafetyInformation, UsageGuide};

/// Document key of the FAQ page.
pub const FAQ_KEY: &str = "faq";
/// Document key of the product page.
pub const PRODUCT_PAGE_KEY: &str = "product_page";
/// Document key of the comparison page.
pub const COMPARISON_PAGE_KEY: &str = "comparison_page";

/// Which generator produced each contributing stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    entries: Vec<(StageName, GenerationMethod)>,
}

impl Provenance {
    /// Creates an empty provenance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stage.
    #[must_use]
    pub fn with(mut self, stage: StageName, method: GenerationMethod) -> Self {
        self.entries.push((stage, method));
        self
    }

    /// Returns true if any contributing stage used its fallback.
    #[must_use]
    pub fn any_fallback(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, m)| *m == GenerationMethod::Fallback)
    }

    /// The `generated_by` label, e.g. `contentflow/0.1.0 (questions=fallback)`.
    #[must_use]
    pub fn generated_by(&self) -> String {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(stage, method)| format!("{stage}={method}"))
            .collect();
        format!("contentflow/{} ({})", env!("CARGO_PKG_VERSION"), parts.join(", "))
    }
}

/// One FAQ entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    /// The question.
    pub question: String,
    /// The answer.
    pub answer: String,
    /// Question category.
    pub category: String,
}

/// FAQ document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqPage {
    /// Product name.
    pub product_name: String,
    /// Number of entries.
    pub total_questions: usize,
    /// Categories in first-seen order.
    pub categories: Vec<String>,
    /// Entries.
    pub faqs: Vec<FaqItem>,
    /// Provenance label.
    pub generated_by: String,
}

/// Product description document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    /// Product name.
    pub product_name: String,
    /// Tagline.
    pub tagline: String,
    /// Description.
    pub description: String,
    /// Feature bullets.
    pub key_features: Vec<String>,
    /// Ingredient name to description.
    pub ingredients: BTreeMap<String, String>,
    /// Usage guide.
    pub usage_guide: UsageGuide,
    /// Skin types.
    pub suitable_for: Vec<String>,
    /// Benefits.
    pub benefits: Vec<String>,
    /// Safety block.
    pub safety_information: SafetyInformation,
    /// Pricing block.
    pub pricing: Pricing,
    /// Provenance label.
    pub generated_by: String,
}

/// Comparison document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonPage {
    /// The product.
    pub product_a: ProductSummary,
    /// The competitor.
    pub product_b: ProductSummary,
    /// Compared dimensions.
    pub comparison_points: Vec<ComparisonPoint>,
    /// Summary entries.
    pub summary: BTreeMap<String, String>,
    /// Recommendation.
    pub recommendation: String,
    /// Provenance label.
    pub generated_by: String,
}

/// A finished document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "page_type")]
pub enum Page {
    /// FAQ page.
    #[serde(rename = "faq")]
    Faq(FaqPage),
    /// Product description page.
    #[serde(rename = "product_page")]
    Product(ProductPage),
    /// Comparison page.
    #[serde(rename = "comparison")]
    Comparison(ComparisonPage),
}

impl Page {
    /// The key the document is stored under.
    #[must_use]
    pub fn document_key(&self) -> &'static str {
        match self {
            Self::Faq(_) => FAQ_KEY,
            Self::Product(_) => PRODUCT_PAGE_KEY,
            Self::Comparison(_) => COMPARISON_PAGE_KEY,
        }
    }

    /// The provenance label.
    #[must_use]
    pub fn generated_by(&self) -> &str {
        match self {
            Self::Faq(p) => &p.generated_by,
            Self::Product(p) => &p.generated_by,
            Self::Comparison(p) => &p.generated_by,
        }
    }
}

/// Builds the FAQ page; answers pair with questions by position.
#[must_use]
pub fn assemble_faq(
    product: &Product,
    questions: &QuestionSet,
    answers: &AnswerSet,
    provenance: &Provenance,
) -> FaqPage {
    let faqs: Vec<FaqItem> = questions
        .questions
        .iter()
        .zip(&answers.answers)
        .map(|(q, a)| FaqItem {
            question: q.question.clone(),
            answer: a.text.trim().to_string(),
            category: q.category.clone(),
        })
        .collect();

    FaqPage {
        product_name: product.name.clone(),
        total_questions: faqs.len(),
        categories: questions.categories.clone(),
        faqs,
        generated_by: provenance.generated_by(),
    }
}

/// Builds the product page.
#[must_use]
pub fn assemble_product_page(
    product: &Product,
    content: &PageContent,
    provenance: &Provenance,
) -> ProductPage {
    ProductPage {
        product_name: product.name.clone(),
        tagline: content.tagline.clone(),
        description: content.description.clone(),
        key_features: content.key_features.clone(),
        ingredients: blocks::ingredient_table(product, &content.ingredient_descriptions),
        usage_guide: blocks::usage_guide(product, content.usage_highlights.as_ref()),
        suitable_for: product.skin_types.clone(),
        benefits: product.benefits.clone(),
        safety_information: blocks::safety_information(product, content),
        pricing: blocks::pricing(product),
        generated_by: provenance.generated_by(),
    }
}

/// Builds the comparison page.
#[must_use]
pub fn assemble_comparison(comparison: &ComparisonResult, provenance: &Provenance) -> ComparisonPage {
    ComparisonPage {
        product_a: comparison.product_a.summary(),
        product_b: comparison.product_b.summary(),
        comparison_points: comparison.comparison_points.clone(),
        summary: comparison.summary.clone(),
        recommendation: comparison.recommendation.clone(),
        generated_by: provenance.generated_by(),
    }
}
