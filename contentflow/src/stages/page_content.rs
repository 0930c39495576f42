//! Product page copy.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{pad_to, ContentStage};
use crate::core::StageName;
use crate::errors::{FallbackExhaustionError, GenerationError};
use crate::models::{PageContent, Product, UsageHighlights};
use crate::pages::blocks::{application_amount, ingredient_table, sensitive_skin_note, usage_timing};
use crate::providers::{parse, prompts, Generator};
use crate::validators::{PageContentRules, PageContentValidator, Rejection, Validator};

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn list_or(items: &[String], sep: &str, empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(sep)
    }
}

/// Composes page copy from product fields alone.
#[must_use]
pub fn template_page_content(product: &Product, rules: &PageContentRules) -> PageContent {
    let benefit = product.primary_benefit().unwrap_or("skincare");
    let ingredient = product.primary_ingredient().unwrap_or("active ingredients");
    let tagline = pad_to(
        format!("{} with {ingredient}", title_case(benefit)),
        rules.min_tagline_chars,
        "for every day",
    );

    let serum = match product.concentration.as_deref() {
        Some(c) => format!("a {c} serum"),
        None => "a serum".to_string(),
    };
    let mut description = format!(
        "{} is {serum} designed for {} skin. Formulated with {}, it delivers {} benefits.",
        product.name,
        list_or(&product.skin_types, " and ", "all"),
        list_or(&product.key_ingredients, ", ", "carefully selected actives"),
        list_or(&product.benefits, " and ", "everyday skincare").to_lowercase(),
    );
    if !product.usage_instructions.is_empty() {
        description.push(' ');
        description.push_str(product.usage_instructions.trim_end_matches('.'));
        description.push('.');
    }
    let description = pad_to(
        description,
        rules.min_description_chars,
        "Suitable for daily skincare routines.",
    );

    let mut key_features = vec![
        match product.concentration.as_deref() {
            Some(c) => format!("{c} formulation"),
            None => "Balanced formulation".to_string(),
        },
        format!("Suitable for {} skin", list_or(&product.skin_types, " & ", "all")),
        format!(
            "Contains {}",
            list_or(&product.key_ingredients, ", ", "carefully selected actives")
        ),
        format!("Provides {} key benefits", product.benefits.len()),
    ];
    let mut n = 1;
    while key_features.len() < rules.min_key_features {
        key_features.push(format!("Dermatologically considered formula #{n}"));
        n += 1;
    }

    let mut precautions = vec![
        "Perform a patch test before first use".to_string(),
        "Avoid contact with eyes".to_string(),
    ];
    if product.key_ingredients.iter().any(|i| {
        let lower = i.to_lowercase();
        lower.contains("vitamin c") || lower.contains("acid")
    }) {
        precautions.push("Use sunscreen during the day when using this product".to_string());
    }
    if product.mentions_sensitive_skin() {
        precautions.push(
            "May cause tingling for sensitive skin - discontinue if irritation occurs".to_string(),
        );
    }
    let mut n = 1;
    while precautions.len() < rules.min_precautions {
        precautions.push(format!("Consult a dermatologist if irritation persists ({n})"));
        n += 1;
    }

    let usage = &product.usage_instructions;
    PageContent {
        tagline,
        description,
        key_features,
        precautions,
        ingredient_descriptions: ingredient_table(product, &Default::default()),
        usage_highlights: Some(UsageHighlights {
            timing: usage_timing(usage).to_string(),
            application_amount: application_amount(usage),
            application_order: "after cleansing, before moisturizer".to_string(),
            frequency: "daily".to_string(),
            tips: usage.clone(),
        }),
        sensitive_skin_note: Some(sensitive_skin_note(product)),
    }
}

/// Writes the product page copy.
pub struct PageContentStage {
    generator: Arc<dyn Generator>,
    rules: PageContentRules,
    validator: PageContentValidator,
}

impl PageContentStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>, rules: PageContentRules) -> Self {
        Self {
            generator,
            validator: PageContentValidator::new(rules.clone()),
            rules,
        }
    }
}

impl fmt::Debug for PageContentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContentStage")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContentStage for PageContentStage {
    type Input = Arc<Product>;
    type Artifact = PageContent;

    fn name(&self) -> StageName {
        StageName::PageContent
    }

    async fn primary(&self, product: &Arc<Product>) -> Result<PageContent, GenerationError> {
        let text = self.generator.generate(&prompts::page_content(product)).await?;
        parse::page_content(&text)
    }

    fn fallback(&self, product: &Arc<Product>) -> Result<PageContent, FallbackExhaustionError> {
        Ok(template_page_content(product, &self.rules))
    }

    fn validate(&self, content: &PageContent, _product: &Arc<Product>) -> Result<(), Rejection> {
        self.validator.check(content, &())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::DisabledGenerator;
    use crate::testing::sample_product;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_template_for_sample() {
        let content = template_page_content(&sample_product(), &PageContentRules::default());
        assert_eq!(content.tagline, "Brightening with Vitamin C");
        assert_eq!(
            content.description,
            "GlowBoost Vitamin C Serum is a 10% serum designed for Oily and Dry skin. \
             Formulated with Vitamin C, Hyaluronic Acid, it delivers brightening and hydration benefits. \
             Apply at night."
        );
        assert_eq!(content.key_features[0], "10% formulation");
        assert_eq!(content.key_features.len(), 4);
        assert_eq!(content.precautions.len(), 3);
        assert!(content.precautions[2].contains("sunscreen"));
        assert_eq!(content.usage_highlights.unwrap().timing, "evening");
    }

    #[test]
    fn test_sensitive_side_effects_add_precaution() {
        let mut product = sample_product();
        product.side_effects = Some("Tingling on sensitive skin".into());
        let content = template_page_content(&product, &PageContentRules::default());
        assert!(content.precautions.iter().any(|p| p.contains("tingling")));
    }

    #[test]
    fn test_fallback_passes_validator_for_bare_product() {
        let stage = PageContentStage::new(Arc::new(DisabledGenerator), PageContentRules::default());
        for product in [Product::named("X"), sample_product()] {
            let product = Arc::new(product);
            let content = stage.fallback(&product).unwrap();
            assert!(stage.validate(&content, &product).is_ok(), "{content:?}");
        }
    }

    #[test]
    fn test_fallback_honours_stricter_rules() {
        let rules = PageContentRules {
            min_tagline_chars: 40,
            min_description_chars: 300,
            min_key_features: 6,
            min_precautions: 5,
        };
        let stage = PageContentStage::new(Arc::new(DisabledGenerator), rules);
        let product = Arc::new(sample_product());
        let content = stage.fallback(&product).unwrap();
        assert!(stage.validate(&content, &product).is_ok());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("anti-aging glow"), "Anti-aging Glow");
        assert_eq!(title_case(""), "");
    }
}
