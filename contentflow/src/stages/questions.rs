//! Question generation.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::ContentStage;
use crate::core::StageName;
use crate::errors::{FallbackExhaustionError, GenerationError};
use crate::models::{CategorizedQuestion, Product, QuestionSet};
use crate::providers::{parse, prompts, Generator};
use crate::validators::{QuestionRules, QuestionValidator, Rejection, Validator};

/// Per-category templates; `{name}` is replaced with the product name.
const TEMPLATES: &[(&str, &[&str])] = &[
    (
        "Informational",
        &[
            "What is {name}?",
            "What are the key ingredients in {name}?",
            "What is the concentration of active ingredients in {name}?",
            "What are the main benefits of using {name}?",
        ],
    ),
    (
        "Usage",
        &[
            "How do I use {name}?",
            "When should I apply {name}?",
            "How many drops of {name} should I use?",
            "Can I use {name} with other skincare products?",
        ],
    ),
    (
        "Safety",
        &[
            "Are there any side effects of {name}?",
            "Is {name} safe for sensitive skin?",
            "What should I do if I experience irritation from {name}?",
        ],
    ),
    (
        "Skin Type",
        &[
            "What skin types is {name} best for?",
            "Can people with combination skin use {name}?",
        ],
    ),
    (
        "Purchase",
        &[
            "What is the price of {name}?",
            "Where can I buy {name}?",
            "Is {name} worth the price?",
        ],
    ),
    (
        "Comparison",
        &[
            "How does {name} compare to similar serums?",
            "What makes {name} different from other serums?",
        ],
    ),
    (
        "Results",
        &[
            "How long does it take to see results from {name}?",
            "What results can I expect from {name}?",
        ],
    ),
];

#[derive(Default)]
struct Collector {
    questions: Vec<CategorizedQuestion>,
    seen: HashSet<String>,
}

impl Collector {
    /// Adds the question unless its text is already present.
    fn push(&mut self, category: &str, text: String, priority: u32) {
        if self.seen.insert(text.trim().to_lowercase()) {
            self.questions.push(CategorizedQuestion::new(category, text, priority));
        }
    }

    fn has_category(&self, category: &str) -> bool {
        self.questions
            .iter()
            .any(|q| q.category.eq_ignore_ascii_case(category))
    }
}

/// Builds the template question set for a product.
///
/// Pure: the same product and rules always yield the same questions. Every
/// required category gets at least one question and the set is topped up to
/// `min_questions`.
#[must_use]
pub fn template_questions(product: &Product, rules: &QuestionRules) -> QuestionSet {
    let name = product.name.as_str();
    let mut collector = Collector::default();

    for (category, templates) in TEMPLATES {
        for (i, template) in templates.iter().enumerate() {
            collector.push(category, template.replace("{name}", name), priority(i));
        }
        if *category == "Skin Type" {
            for (i, skin) in product.skin_types.iter().enumerate() {
                collector.push(
                    category,
                    format!("Is {name} suitable for {} skin?", skin.to_lowercase()),
                    priority(templates.len() + i),
                );
            }
        }
    }

    for (i, ingredient) in product.key_ingredients.iter().enumerate() {
        collector.push(
            "Ingredients",
            format!("What does {ingredient} do in {name}?"),
            priority(i),
        );
    }

    for required in &rules.required_categories {
        let topic = required.trim().to_lowercase();
        let mut n = 1;
        while !collector.has_category(required) {
            let text = if n == 1 {
                format!("What should I know about {topic} when using {name}?")
            } else {
                format!("What else should I know about {topic} when using {name} ({n})?")
            };
            collector.push(required, text, priority(0));
            n += 1;
        }
    }

    let mut n = 1;
    while collector.questions.len() < rules.min_questions {
        collector.push(
            "Informational",
            format!("Is there anything else to know about {name} ({n})?"),
            priority(n),
        );
        n += 1;
    }

    QuestionSet::new(collector.questions)
}

fn priority(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// Generates categorized questions about the product.
pub struct QuestionStage {
    generator: Arc<dyn Generator>,
    rules: QuestionRules,
    validator: QuestionValidator,
}

impl QuestionStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>, rules: QuestionRules) -> Self {
        Self {
            generator,
            validator: QuestionValidator::new(rules.clone()),
            rules,
        }
    }
}

impl fmt::Debug for QuestionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuestionStage")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContentStage for QuestionStage {
    type Input = Arc<Product>;
    type Artifact = QuestionSet;

    fn name(&self) -> StageName {
        StageName::Questions
    }

    async fn primary(&self, product: &Arc<Product>) -> Result<QuestionSet, GenerationError> {
        let text = self.generator.generate(&prompts::questions(product)).await?;
        parse::questions(&text)
    }

    fn fallback(&self, product: &Arc<Product>) -> Result<QuestionSet, FallbackExhaustionError> {
        Ok(template_questions(product, &self.rules))
    }

    fn validate(&self, set: &QuestionSet, _product: &Arc<Product>) -> Result<(), Rejection> {
        self.validator.check(set, &())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::DisabledGenerator;
    use crate::testing::{sample_product, ScriptedGenerator};
    use pretty_assertions::assert_eq;

    fn stage(generator: Arc<dyn Generator>) -> QuestionStage {
        QuestionStage::new(generator, QuestionRules::default())
    }

    #[test]
    fn test_fallback_satisfies_validator() {
        let product = Arc::new(sample_product());
        let stage = stage(Arc::new(DisabledGenerator));
        let set = stage.fallback(&product).unwrap();

        assert!(set.len() >= 15);
        assert!(stage.validate(&set, &product).is_ok());
        assert!(set.has_category("Ingredients"));
        assert!(set
            .questions
            .iter()
            .any(|q| q.question == "Is GlowBoost Vitamin C Serum suitable for oily skin?"));
    }

    #[test]
    fn test_fallback_is_idempotent() {
        let product = sample_product();
        let rules = QuestionRules::default();
        assert_eq!(template_questions(&product, &rules), template_questions(&product, &rules));
    }

    #[test]
    fn test_fallback_minimal_product() {
        let product = Arc::new(Product::named("Plain Serum"));
        let stage = stage(Arc::new(DisabledGenerator));
        let set = stage.fallback(&product).unwrap();
        assert!(stage.validate(&set, &product).is_ok());
    }

    #[test]
    fn test_fallback_dedupes_skin_type_questions() {
        let mut product = Product::named("Serum");
        product.skin_types = vec!["Oily".into(), "oily".into()];
        let set = template_questions(&product, &QuestionRules::default());
        let count = set
            .questions
            .iter()
            .filter(|q| q.question.contains("suitable for oily"))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_fallback_honours_stricter_rules() {
        let rules = QuestionRules {
            min_questions: 25,
            required_categories: vec!["Informational".into(), "Safety".into(), "Storage".into()],
        };
        let product = Arc::new(Product::named("Plain Serum"));
        let stage = QuestionStage::new(Arc::new(DisabledGenerator), rules);

        let set = stage.fallback(&product).unwrap();

        assert_eq!(set.len(), 25);
        assert!(set.has_category("Storage"));
        assert!(set
            .questions
            .iter()
            .any(|q| q.question == "What should I know about storage when using Plain Serum?"));
        assert!(stage.validate(&set, &product).is_ok());
    }

    #[test]
    fn test_fallback_keeps_templates_under_loose_rules() {
        let rules = QuestionRules {
            min_questions: 1,
            required_categories: Vec::new(),
        };
        let product = sample_product();
        assert_eq!(
            template_questions(&product, &rules),
            template_questions(&product, &QuestionRules::default())
        );
    }

    #[tokio::test]
    async fn test_primary_parses_generator_output() {
        let expected = template_questions(&sample_product(), &QuestionRules::default());
        let body = serde_json::to_string(&expected.questions).unwrap();
        let generator = Arc::new(ScriptedGenerator::new().with_response(StageName::Questions, body));
        let stage = stage(generator.clone());

        let set = stage.primary(&Arc::new(sample_product())).await.unwrap();
        assert_eq!(set, expected);
        assert_eq!(generator.call_count(StageName::Questions), 1);
    }

    #[tokio::test]
    async fn test_primary_garbage_is_parse_error() {
        let generator = Arc::new(ScriptedGenerator::new().with_response(StageName::Questions, "sorry"));
        let err = stage(generator).primary(&Arc::new(sample_product())).await.unwrap_err();
        assert_eq!(err.kind(), "parse");
    }
}
