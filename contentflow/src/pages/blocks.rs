//! Reusable content blocks derived from product fields.
//!
//! Every block is a pure function of its inputs.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::models::{PageContent, Product, UsageHighlights};

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid regex"));

static DROPS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*[-–]?\s*(\d+)?\s*drops").expect("valid regex"));

/// Returns the first number in `text`.
#[must_use]
pub fn first_number(text: &str) -> Option<f64> {
    NUMBER_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Replaces the first number in `text` with `f(number)`.
///
/// Returns `None` when `text` holds no number.
#[must_use]
pub fn map_first_number(text: &str, decimals: usize, f: impl Fn(f64) -> f64) -> Option<String> {
    let m = NUMBER_RE.find(text)?;
    let value: f64 = m.as_str().parse().ok()?;
    Some(format!(
        "{}{}{}",
        &text[..m.start()],
        format_number(f(value), decimals),
        &text[m.end()..]
    ))
}

/// Formats with at most `decimals` places, dropping trailing zeros.
#[must_use]
pub fn format_number(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// When in the day the product is applied.
#[must_use]
pub fn usage_timing(instructions: &str) -> &'static str {
    let lower = instructions.to_lowercase();
    let morning = lower.contains("morning");
    let evening = lower.contains("evening") || lower.contains("night");
    match (morning, evening) {
        (true, true) => "morning and evening",
        (true, false) => "morning",
        (false, true) => "evening",
        (false, false) => "as directed",
    }
}

/// The dose, e.g. "2-3 drops", or "as directed".
#[must_use]
pub fn application_amount(instructions: &str) -> String {
    DROPS_RE
        .captures(instructions)
        .map_or_else(
            || "as directed".to_string(),
            |caps| match (caps.get(1), caps.get(2)) {
                (Some(a), Some(b)) => format!("{}-{} drops", a.as_str(), b.as_str()),
                (Some(a), None) => format!("{} drops", a.as_str()),
                _ => "as directed".to_string(),
            },
        )
}

/// How to use the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageGuide {
    /// Morning, evening or as directed.
    pub timing: String,
    /// Dose per application.
    pub application_amount: String,
    /// The instructions as given.
    pub full_instructions: String,
    /// Where it goes in a routine.
    pub application_order: String,
    /// How often.
    pub frequency: String,
    /// Extra tips, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
}

fn or_derived(value: Option<&str>, derived: String) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => derived,
    }
}

/// Usage guide from the instructions, refined by generated highlights.
#[must_use]
pub fn usage_guide(product: &Product, highlights: Option<&UsageHighlights>) -> UsageGuide {
    let text = &product.usage_instructions;
    UsageGuide {
        timing: or_derived(highlights.map(|h| h.timing.as_str()), usage_timing(text).to_string()),
        application_amount: or_derived(
            highlights.map(|h| h.application_amount.as_str()),
            application_amount(text),
        ),
        full_instructions: if text.is_empty() {
            "Follow the directions on the packaging".to_string()
        } else {
            text.clone()
        },
        application_order: or_derived(
            highlights.map(|h| h.application_order.as_str()),
            "see instructions".to_string(),
        ),
        frequency: or_derived(
            highlights.map(|h| h.frequency.as_str()),
            "as directed".to_string(),
        ),
        tips: highlights
            .map(|h| h.tips.trim().to_string())
            .filter(|t| !t.is_empty()),
    }
}

/// Price details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    /// Price as given.
    pub price: String,
    /// Numeric part of the price, "0" when absent.
    pub price_value: String,
    /// ISO currency code.
    pub currency: String,
    /// Rough price band.
    pub value_rating: String,
}

/// Detects the currency from its symbol or code; INR when unmarked.
#[must_use]
pub fn detect_currency(price: &str) -> &'static str {
    let upper = price.to_uppercase();
    if price.contains('$') || upper.contains("USD") {
        "USD"
    } else if price.contains('€') || upper.contains("EUR") {
        "EUR"
    } else if price.contains('£') || upper.contains("GBP") {
        "GBP"
    } else {
        "INR"
    }
}

/// Pricing block.
#[must_use]
pub fn pricing(product: &Product) -> Pricing {
    let value = first_number(&product.price);
    let value_rating = match value {
        None => "unknown",
        Some(v) if v < 500.0 => "budget",
        Some(v) if v < 1000.0 => "mid-range",
        Some(_) => "premium",
    };
    Pricing {
        price: product.price.clone(),
        price_value: value.map_or_else(|| "0".to_string(), |v| format_number(v, 2)),
        currency: detect_currency(&product.price).to_string(),
        value_rating: value_rating.to_string(),
    }
}

/// Safety details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyInformation {
    /// Known side effects or "None reported".
    pub side_effects: String,
    /// Precautions.
    pub precautions: Vec<String>,
    /// Sensitive-skin guidance.
    pub suitable_for_sensitive_skin: String,
    /// Warnings or "None".
    pub warnings: String,
}

/// Safety block from the product and its page copy.
#[must_use]
pub fn safety_information(product: &Product, content: &PageContent) -> SafetyInformation {
    SafetyInformation {
        side_effects: product
            .side_effects
            .clone()
            .unwrap_or_else(|| "None reported".to_string()),
        precautions: content.precautions.clone(),
        suitable_for_sensitive_skin: content
            .sensitive_skin_note
            .clone()
            .unwrap_or_else(|| sensitive_skin_note(product)),
        warnings: product
            .side_effects
            .clone()
            .unwrap_or_else(|| "None".to_string()),
    }
}

/// Default guidance for sensitive skin.
#[must_use]
pub fn sensitive_skin_note(product: &Product) -> String {
    if product.mentions_sensitive_skin() {
        "With caution: patch test first, as some sensitive skin may react".to_string()
    } else if product
        .skin_types
        .iter()
        .any(|s| s.eq_ignore_ascii_case("sensitive"))
    {
        "Yes: formulated with sensitive skin in mind".to_string()
    } else {
        "Check product details and patch test before first use".to_string()
    }
}

/// One-line description of a well-known ingredient.
#[must_use]
pub fn known_ingredient(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "vitamin c" => Some("Powerful antioxidant that brightens skin and reduces dark spots"),
        "hyaluronic acid" => Some("Deeply hydrates and plumps skin by retaining moisture"),
        "vitamin e" => Some("Antioxidant that nourishes and protects the skin barrier"),
        "ferulic acid" => Some("Boosts the stability and effectiveness of vitamins C and E"),
        "niacinamide" => Some("Refines pores and evens out skin tone"),
        "retinol" => Some("Supports cell renewal to smooth fine lines"),
        "peptides" => Some("Support firmness and elasticity"),
        "squalane" => Some("Lightweight emollient that locks in moisture"),
        _ => None,
    }
}

/// Ingredient table: generated descriptions first, then known ones, then a default.
#[must_use]
pub fn ingredient_table(product: &Product, generated: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    product
        .key_ingredients
        .iter()
        .map(|name| {
            let description = generated
                .iter()
                .find(|(k, v)| k.eq_ignore_ascii_case(name) && !v.trim().is_empty())
                .map(|(_, v)| v.clone())
                .or_else(|| known_ingredient(name).map(ToString::to_string))
                .unwrap_or_else(|| "Key active ingredient".to_string());
            (name.clone(), description)
        })
        .collect()
}
