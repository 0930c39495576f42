//! Competitor synthesis and comparison.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::ContentStage;
use crate::core::StageName;
use crate::errors::{FallbackExhaustionError, GenerationError};
use crate::models::{ComparisonPoint, ComparisonResult, Product};
use crate::pages::blocks::{first_number, map_first_number, usage_timing};
use crate::providers::{parse, prompts, Generator};
use crate::validators::{ComparisonRules, ComparisonValidator, Rejection, Validator};

const SCALE: f64 = 1.2;
const DEFAULT_CONCENTRATION: &str = "15%";
const DEFAULT_PRICE: &str = "₹999";
const COMPLEMENTARY: &[&str] = &["Vitamin E", "Ferulic Acid", "Niacinamide", "Peptides", "Squalane"];
const EXTRA_SKIN_TYPES: &[&str] = &["Normal", "Combination", "Sensitive"];
const TIE: &str = "Tie";

fn contains_ci(items: &[String], needle: &str) -> bool {
    items.iter().any(|i| i.eq_ignore_ascii_case(needle))
}

fn with_first_missing(mut items: Vec<String>, candidates: &[&str], last_resort: &str) -> Vec<String> {
    let extra = candidates
        .iter()
        .find(|c| !contains_ci(&items, c))
        .map_or(last_resort, |c| *c);
    if !contains_ci(&items, extra) {
        items.push(extra.to_string());
    }
    items
}

/// Scales the first number by 20%; falls back to `default` and finally to a suffix.
fn perturb(original: &str, decimals: usize, default: &str) -> String {
    let candidate = map_first_number(original, decimals, |v| v * SCALE)
        .filter(|c| c != original)
        .unwrap_or_else(|| default.to_string());
    if candidate == original {
        format!("{original} (alternative)")
    } else {
        candidate
    }
}

/// Derives a competitor from the product.
///
/// A product without key ingredients still gets a competitor built around a
/// complementary ingredient. Only a nameless product, which the record
/// builder never produces, is refused.
pub fn synthesize_competitor(product: &Product) -> Result<Product, FallbackExhaustionError> {
    if product.name.trim().is_empty() {
        return Err(FallbackExhaustionError::new(
            StageName::Comparison.as_str(),
            "cannot derive a competitor from a product without a name",
        ));
    }

    let first_word = product.name.split_whitespace().next().unwrap_or("Generic");
    let mut name = format!("Alternative {first_word} Serum");
    if name.eq_ignore_ascii_case(&product.name) {
        name.push_str(" Plus");
    }

    let mut ingredients = product.key_ingredients.clone();
    if ingredients.len() > 1 {
        ingredients.pop();
    }
    let ingredients = with_first_missing(ingredients, COMPLEMENTARY, "Botanical Extract");

    let skin_types = if product.skin_types.is_empty() {
        vec!["All Skin Types".to_string()]
    } else {
        with_first_missing(product.skin_types.clone(), EXTRA_SKIN_TYPES, "All Skin Types")
    };

    let benefits = with_first_missing(product.benefits.clone(), &["Anti-aging", "Firming"], "Radiance");

    let usage_instructions = if usage_timing(&product.usage_instructions) == "morning" {
        "Apply 3-4 drops in the evening after cleansing"
    } else {
        "Apply 3-4 drops in the morning after cleansing"
    };

    Ok(Product {
        name,
        concentration: Some(perturb(product.concentration_text(), 1, DEFAULT_CONCENTRATION)),
        skin_types,
        key_ingredients: ingredients,
        benefits,
        usage_instructions: usage_instructions.to_string(),
        side_effects: Some("May cause slight redness initially".to_string()),
        price: perturb(&product.price, 0, DEFAULT_PRICE),
    })
}

/// Picks the winner of a numeric dimension.
fn winner_by<T: PartialOrd>(
    a: &Product,
    b: &Product,
    va: Option<T>,
    vb: Option<T>,
    higher_wins: bool,
) -> String {
    match (va, vb) {
        (Some(va), Some(vb)) => match va.partial_cmp(&vb) {
            Some(Ordering::Greater) if higher_wins => a.name.clone(),
            Some(Ordering::Less) if !higher_wins => a.name.clone(),
            Some(Ordering::Equal) | None => TIE.to_string(),
            _ => b.name.clone(),
        },
        _ => TIE.to_string(),
    }
}

fn joined(items: &[String]) -> String {
    if items.is_empty() {
        "Not specified".to_string()
    } else {
        items.join(", ")
    }
}

/// The seven mechanical comparison points.
#[must_use]
pub fn compare_products(a: &Product, b: &Product) -> Vec<ComparisonPoint> {
    let common: Vec<&String> = a
        .key_ingredients
        .iter()
        .filter(|i| contains_ci(&b.key_ingredients, i))
        .collect();
    let overlap = if common.is_empty() {
        "No common ingredients".to_string()
    } else {
        format!(
            "Common: {}",
            common.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
        )
    };

    let timing_a = usage_timing(&a.usage_instructions);
    let timing_b = usage_timing(&b.usage_instructions);

    vec![
        ComparisonPoint::new("Price", &a.price, &b.price).with_winner(winner_by(
            a,
            b,
            first_number(&a.price),
            first_number(&b.price),
            false,
        )),
        ComparisonPoint::new("Concentration", a.concentration_text(), b.concentration_text())
            .with_winner(winner_by(
                a,
                b,
                first_number(a.concentration_text()),
                first_number(b.concentration_text()),
                true,
            )),
        ComparisonPoint::new(
            "Number of Key Ingredients",
            a.key_ingredients.len().to_string(),
            b.key_ingredients.len().to_string(),
        )
        .with_winner(winner_by(a, b, Some(a.key_ingredients.len()), Some(b.key_ingredients.len()), true)),
        ComparisonPoint::new("Suitable Skin Types", joined(&a.skin_types), joined(&b.skin_types))
            .with_winner(winner_by(a, b, Some(a.skin_types.len()), Some(b.skin_types.len()), true)),
        ComparisonPoint::new(
            "Number of Benefits",
            a.benefits.len().to_string(),
            b.benefits.len().to_string(),
        )
        .with_winner(winner_by(a, b, Some(a.benefits.len()), Some(b.benefits.len()), true)),
        ComparisonPoint::new("Ingredient Overlap", joined(&a.key_ingredients), joined(&b.key_ingredients))
            .with_winner(overlap),
        ComparisonPoint::new("Recommended Application Time", timing_a, timing_b)
            .with_winner(if timing_a == timing_b { "Same" } else { "Flexible" }),
    ]
}

/// Counts per-product wins and builds the summary map and recommendation.
fn summarize(a: &Product, b: &Product, points: &[ComparisonPoint]) -> (BTreeMap<String, String>, String) {
    let wins = |name: &str| {
        points
            .iter()
            .filter(|p| p.winner.as_deref() == Some(name))
            .count()
    };
    let (wins_a, wins_b) = (wins(&a.name), wins(&b.name));

    let mut summary = BTreeMap::new();
    summary.insert("total_comparisons".to_string(), points.len().to_string());
    summary.insert("product_a_wins".to_string(), wins_a.to_string());
    summary.insert("product_b_wins".to_string(), wins_b.to_string());
    summary.insert("ties".to_string(), (points.len() - wins_a - wins_b).to_string());

    let skin = if a.skin_types.is_empty() {
        "all".to_string()
    } else {
        a.skin_types.join(" or ").to_lowercase()
    };

    let (winner, recommendation) = match wins_a.cmp(&wins_b) {
        Ordering::Greater => (
            a.name.clone(),
            format!(
                "Choose {} if you're looking for an affordable, effective serum for {skin} skin.",
                a.name
            ),
        ),
        Ordering::Less => (
            b.name.clone(),
            format!(
                "Choose {} if you want a higher concentration and a broader range of benefits.",
                b.name
            ),
        ),
        Ordering::Equal => (
            TIE.to_string(),
            format!(
                "Both products are solid choices. {} offers better value while {} offers a stronger formulation. Choose based on your primary concern and budget.",
                a.name, b.name
            ),
        ),
    };
    summary.insert("winner".to_string(), winner);
    summary.insert(
        "key_differences".to_string(),
        format!(
            "{} offers a targeted formulation at {} while {} provides broader compatibility at {}.",
            a.name,
            if a.price.is_empty() { "an unlisted price" } else { a.price.as_str() },
            b.name,
            b.price
        ),
    );
    (summary, recommendation)
}

/// Builds the full comparison locally.
pub fn mechanical_comparison(product: &Product) -> Result<ComparisonResult, FallbackExhaustionError> {
    let competitor = synthesize_competitor(product)?;
    let points = compare_products(product, &competitor);
    let (summary, recommendation) = summarize(product, &competitor, &points);
    Ok(ComparisonResult {
        product_a: product.clone(),
        product_b: competitor,
        comparison_points: points,
        summary,
        recommendation,
    })
}

/// Invents a competitor and compares it with the product.
pub struct ComparisonStage {
    generator: Arc<dyn Generator>,
    validator: ComparisonValidator,
}

impl ComparisonStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>, rules: ComparisonRules) -> Self {
        Self {
            generator,
            validator: ComparisonValidator::new(rules),
        }
    }
}

impl fmt::Debug for ComparisonStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparisonStage")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContentStage for ComparisonStage {
    type Input = Arc<Product>;
    type Artifact = ComparisonResult;

    fn name(&self) -> StageName {
        StageName::Comparison
    }

    async fn primary(&self, product: &Arc<Product>) -> Result<ComparisonResult, GenerationError> {
        let text = self.generator.generate(&prompts::comparison(product)).await?;
        parse::comparison(&text, product)
    }

    fn fallback(&self, product: &Arc<Product>) -> Result<ComparisonResult, FallbackExhaustionError> {
        mechanical_comparison(product)
    }

    fn validate(&self, result: &ComparisonResult, _product: &Arc<Product>) -> Result<(), Rejection> {
        self.validator.check(result, &())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::DisabledGenerator;
    use crate::testing::sample_product;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_competitor_for_sample() {
        let b = synthesize_competitor(&sample_product()).unwrap();
        assert_eq!(b.name, "Alternative GlowBoost Serum");
        assert_eq!(b.concentration.as_deref(), Some("12%"));
        assert_eq!(b.price, "839");
        assert_eq!(b.key_ingredients, vec!["Vitamin C", "Vitamin E"]);
        assert_eq!(b.skin_types, vec!["Oily", "Dry", "Normal"]);
        assert_eq!(b.usage_instructions, "Apply 3-4 drops in the morning after cleansing");
    }

    #[test]
    fn test_competitor_without_numbers() {
        let mut p = sample_product();
        p.concentration = None;
        p.price = "Contact us".into();
        let b = synthesize_competitor(&p).unwrap();
        assert_eq!(b.concentration.as_deref(), Some("15%"));
        assert_eq!(b.price, "₹999");
    }

    #[test]
    fn test_competitor_always_differs_in_concentration_or_price() {
        let cases = [
            (Some("0%"), "0"),
            (Some("15%"), "₹999"),
            (None, ""),
            (Some("Strong"), "₹999"),
        ];
        for (conc, price) in cases {
            let mut p = sample_product();
            p.concentration = conc.map(ToString::to_string);
            p.price = price.to_string();
            let b = synthesize_competitor(&p).unwrap();
            assert!(
                b.concentration != p.concentration || b.price != p.price,
                "competitor matched {conc:?}/{price}"
            );
            assert_ne!(b.price, p.price);
        }
    }

    #[test]
    fn test_competitor_name_never_matches() {
        let p = Product {
            key_ingredients: vec!["Vitamin C".into()],
            ..Product::named("Alternative Alternative Serum")
        };
        let b = synthesize_competitor(&p).unwrap();
        assert_ne!(b.name.to_lowercase(), p.name.to_lowercase());
        assert_eq!(b.key_ingredients, vec!["Vitamin C", "Vitamin E"]);
    }

    #[test]
    fn test_competitor_without_ingredients() {
        let bare = Product {
            price: "₹500".into(),
            ..Product::named("Bare Essentials Toner")
        };
        let b = synthesize_competitor(&bare).unwrap();
        assert_eq!(b.name, "Alternative Bare Serum");
        assert_eq!(b.key_ingredients, vec!["Vitamin E"]);
        assert_eq!(b.skin_types, vec!["All Skin Types"]);
        assert_eq!(b.price, "₹600");

        let stage = ComparisonStage::new(Arc::new(DisabledGenerator), ComparisonRules::default());
        let product = Arc::new(bare);
        let result = stage.fallback(&product).unwrap();
        assert_eq!(result.comparison_points.len(), 7);
        assert!(stage.validate(&result, &product).is_ok());
    }

    #[test]
    fn test_bare_product_still_compares() {
        let result = mechanical_comparison(&Product::named("Bare")).unwrap();
        assert_eq!(result.product_b.name, "Alternative Bare Serum");
        assert_eq!(result.product_b.concentration.as_deref(), Some("15%"));
        assert_eq!(result.product_b.price, "₹999");
        assert!(ComparisonValidator::default().is_valid(&result, &()));
    }

    #[test]
    fn test_nameless_product_exhausts_fallback() {
        let err = synthesize_competitor(&Product::named("  ")).unwrap_err();
        assert_eq!(err.stage, "comparison");
        assert!(mechanical_comparison(&Product::named("")).is_err());
    }

    #[test]
    fn test_mechanical_comparison_points() {
        let result = mechanical_comparison(&sample_product()).unwrap();
        let dims: Vec<_> = result.comparison_points.iter().map(|p| p.dimension.as_str()).collect();
        assert_eq!(
            dims,
            vec![
                "Price",
                "Concentration",
                "Number of Key Ingredients",
                "Suitable Skin Types",
                "Number of Benefits",
                "Ingredient Overlap",
                "Recommended Application Time",
            ]
        );
        let price = &result.comparison_points[0];
        assert_eq!(price.winner.as_deref(), Some("GlowBoost Vitamin C Serum"));
        assert_eq!(result.comparison_points[5].winner.as_deref(), Some("Common: Vitamin C"));
        assert_eq!(result.comparison_points[6].winner.as_deref(), Some("Flexible"));
        assert_eq!(result.summary["total_comparisons"], "7");
        assert!(!result.recommendation.is_empty());
    }

    #[test]
    fn test_fallback_passes_validator() {
        let stage = ComparisonStage::new(Arc::new(DisabledGenerator), ComparisonRules::default());
        let product = Arc::new(sample_product());
        let result = stage.fallback(&product).unwrap();
        assert!(stage.validate(&result, &product).is_ok());
    }
}
