//! Batched answer generation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{pad_to, ContentStage};
use crate::core::StageName;
use crate::errors::{FallbackExhaustionError, GenerationError};
use crate::models::{AnswerSet, CategorizedQuestion, GeneratedAnswer, Product, QuestionSet};
use crate::providers::{parse, prompts, Generator};
use crate::validators::{AnswerRules, AnswerValidator, Rejection, Validator};

const PADDING: &str = "Consult a skincare professional for personalised advice.";

/// Input of the answer stage.
#[derive(Debug, Clone)]
pub struct AnswerInput {
    /// The product being described.
    pub product: Arc<Product>,
    /// The questions to answer, in order.
    pub questions: Arc<QuestionSet>,
}

fn listed(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// Answers one question from product facts by keyword.
#[must_use]
pub fn keyword_answer(product: &Product, question: &CategorizedQuestion) -> String {
    let name = &product.name;
    let q = question.question.to_lowercase();

    if q.contains("what is") {
        let serum = match product.concentration.as_deref() {
            Some(c) => format!("a {c} serum"),
            None => "a serum".to_string(),
        };
        format!(
            "{name} is {serum} formulated for {} skin types.",
            listed(&product.skin_types, "all")
        )
    } else if q.contains("ingredient") {
        if product.key_ingredients.is_empty() {
            format!("The full ingredient list for {name} is printed on its packaging.")
        } else {
            format!(
                "{name} contains {} as key active ingredients.",
                product.key_ingredients.join(", ")
            )
        }
    } else if q.contains("benefit") {
        format!(
            "{name} provides {} benefits.",
            listed(&product.benefits, "skincare").to_lowercase()
        )
    } else if q.contains("how to use") || q.contains("how do i use") {
        if product.usage_instructions.is_empty() {
            format!("Follow the directions on the {name} packaging.")
        } else {
            format!(
                "To use {name}: {}.",
                product.usage_instructions.trim_end_matches('.')
            )
        }
    } else if q.contains("side effect") {
        match product.side_effects.as_deref() {
            Some(effects) if effects.chars().count() > 20 => effects.to_string(),
            _ => "No significant side effects have been reported for this product. However, it's always recommended to perform a patch test before first use.".to_string(),
        }
    } else if q.contains("price") {
        if product.price.is_empty() {
            format!("Pricing for {name} varies by retailer.")
        } else {
            format!("{name} is priced at {}.", product.price)
        }
    } else if q.contains("skin type") {
        format!(
            "{name} is suitable for {} skin types.",
            listed(&product.skin_types, "all")
        )
    } else {
        format!(
            "For detailed information about {}, please refer to the product documentation or consult with a skincare professional.",
            q.replace('?', "").trim()
        )
    }
}

/// Builds one answer per question, each at least `min_chars` long.
#[must_use]
pub fn keyword_answers(product: &Product, questions: &QuestionSet, min_chars: usize) -> AnswerSet {
    AnswerSet {
        answers: questions
            .questions
            .iter()
            .map(|q| GeneratedAnswer::new(pad_to(keyword_answer(product, q), min_chars, PADDING)))
            .collect(),
    }
}

/// Answers every question in one generator call.
pub struct AnswerStage {
    generator: Arc<dyn Generator>,
    rules: AnswerRules,
    validator: AnswerValidator,
}

impl AnswerStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>, rules: AnswerRules) -> Self {
        Self {
            generator,
            validator: AnswerValidator::new(rules.clone()),
            rules,
        }
    }
}

impl fmt::Debug for AnswerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerStage")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContentStage for AnswerStage {
    type Input = AnswerInput;
    type Artifact = AnswerSet;

    fn name(&self) -> StageName {
        StageName::Answers
    }

    async fn primary(&self, input: &AnswerInput) -> Result<AnswerSet, GenerationError> {
        let request = prompts::answers(&input.product, &input.questions);
        let text = self.generator.generate(&request).await?;
        parse::answers(&text)
    }

    fn fallback(&self, input: &AnswerInput) -> Result<AnswerSet, FallbackExhaustionError> {
        Ok(keyword_answers(
            &input.product,
            &input.questions,
            self.rules.min_answer_chars,
        ))
    }

    fn validate(&self, answers: &AnswerSet, input: &AnswerInput) -> Result<(), Rejection> {
        self.validator.check(answers, &input.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::DisabledGenerator;
    use crate::stages::questions::template_questions;
    use crate::testing::{sample_product, ScriptedGenerator};
    use crate::validators::QuestionRules;

    fn input() -> AnswerInput {
        let product = sample_product();
        AnswerInput {
            questions: Arc::new(template_questions(&product, &QuestionRules::default())),
            product: Arc::new(product),
        }
    }

    fn q(text: &str) -> CategorizedQuestion {
        CategorizedQuestion::new("Any", text, 1)
    }

    #[test]
    fn test_keyword_answers() {
        let p = sample_product();
        assert_eq!(
            keyword_answer(&p, &q("What is GlowBoost?")),
            "GlowBoost Vitamin C Serum is a 10% serum formulated for Oily, Dry skin types."
        );
        assert_eq!(
            keyword_answer(&p, &q("What are the key ingredients?")),
            "GlowBoost Vitamin C Serum contains Vitamin C, Hyaluronic Acid as key active ingredients."
        );
        assert_eq!(
            keyword_answer(&p, &q("How do I use it?")),
            "To use GlowBoost Vitamin C Serum: Apply at night."
        );
        assert!(keyword_answer(&p, &q("Any side effects?")).contains("patch test"));
        assert_eq!(
            keyword_answer(&p, &q("How much is the price?")),
            "GlowBoost Vitamin C Serum is priced at 699."
        );
        assert!(keyword_answer(&p, &q("Where can I buy it?"))
            .starts_with("For detailed information about where can i buy it"));
    }

    #[test]
    fn test_long_side_effects_used_verbatim() {
        let mut p = sample_product();
        p.side_effects = Some("Mild tingling for sensitive skin during the first week".into());
        assert_eq!(
            keyword_answer(&p, &q("Are there side effects?")),
            "Mild tingling for sensitive skin during the first week"
        );
    }

    #[test]
    fn test_fallback_one_answer_per_question() {
        let stage = AnswerStage::new(Arc::new(DisabledGenerator), AnswerRules::default());
        let input = input();
        let answers = stage.fallback(&input).unwrap();

        assert_eq!(answers.len(), input.questions.len());
        assert!(answers.answers.iter().all(|a| a.text.trim().chars().count() >= 20));
        assert!(stage.validate(&answers, &input).is_ok());
    }

    #[test]
    fn test_fallback_pads_short_answers() {
        let mut p = Product::named("X");
        p.price = "1".into();
        let set = QuestionSet::new(vec![q("Price?")]);
        let answers = keyword_answers(&p, &set, 40);
        assert!(answers.answers[0].text.chars().count() >= 40);
        assert!(answers.answers[0].text.starts_with("X is priced at 1."));
    }

    #[tokio::test]
    async fn test_primary_count_mismatch_is_rejected() {
        let generator = Arc::new(
            ScriptedGenerator::new().with_response(
                StageName::Answers,
                r#"[{"question": "What?", "answer": "Only one answer, which is long enough."}]"#,
            ),
        );
        let stage = AnswerStage::new(generator, AnswerRules::default());
        let input = input();

        let answers = stage.primary(&input).await.unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(stage.validate(&answers, &input).unwrap_err().rule, "answer_count");
    }
}
