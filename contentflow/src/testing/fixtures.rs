//! Test fixtures.

use crate::config::PipelineConfig;
use crate::models::Product;
use crate::pipeline::RetryPolicy;
use crate::record::{fields, RawRecord};

/// The reference serum record.
#[must_use]
pub fn sample_raw_record() -> RawRecord {
    [
        (fields::PRODUCT_NAME, "GlowBoost Vitamin C Serum"),
        (fields::CONCENTRATION, "10%"),
        (fields::SKIN_TYPE, "Oily,Dry"),
        (fields::KEY_INGREDIENTS, "Vitamin C,Hyaluronic Acid"),
        (fields::BENEFITS, "Brightening,Hydration"),
        (fields::HOW_TO_USE, "Apply at night"),
        (fields::SIDE_EFFECTS, "Mild tingling"),
        (fields::PRICE, "699"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// The reference serum as a built product.
#[must_use]
pub fn sample_product() -> Product {
    Product {
        name: "GlowBoost Vitamin C Serum".to_string(),
        concentration: Some("10%".to_string()),
        skin_types: vec!["Oily".to_string(), "Dry".to_string()],
        key_ingredients: vec!["Vitamin C".to_string(), "Hyaluronic Acid".to_string()],
        benefits: vec!["Brightening".to_string(), "Hydration".to_string()],
        usage_instructions: "Apply at night".to_string(),
        side_effects: Some("Mild tingling".to_string()),
        price: "699".to_string(),
    }
}

/// A configuration whose stages never wait between attempts.
#[must_use]
pub fn offline_config() -> PipelineConfig {
    PipelineConfig::default().with_retry_policy(RetryPolicy::immediate())
}
