//! Raw record → [`Product`].
//!
//! The builder is all-or-nothing: either every required field is present and
//! a complete product comes out, or a [`ValidationError`] names the field.

use crate::errors::{ContentflowError, ValidationError};
use crate::models::Product;
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat input mapping of field name to raw string value.
pub type RawRecord = BTreeMap<String, String>;

/// Input field names.
pub mod fields {
    /// Product name (required).
    pub const PRODUCT_NAME: &str = "product_name";
    /// Concentration text.
    pub const CONCENTRATION: &str = "concentration";
    /// Comma-separated skin types.
    pub const SKIN_TYPE: &str = "skin_type";
    /// Comma-separated key ingredients.
    pub const KEY_INGREDIENTS: &str = "key_ingredients";
    /// Comma-separated benefits.
    pub const BENEFITS: &str = "benefits";
    /// Usage instructions.
    pub const HOW_TO_USE: &str = "how_to_use";
    /// Side effects.
    pub const SIDE_EFFECTS: &str = "side_effects";
    /// Price text.
    pub const PRICE: &str = "price";
}

/// Validates and normalizes a [`RawRecord`].
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    separator: char,
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self { separator: ',' }
    }
}

impl RecordBuilder {
    /// Creates a builder splitting list fields on commas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a different list separator.
    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Builds a product from the raw record.
    pub fn build(&self, raw: &RawRecord) -> Result<Product, ValidationError> {
        let name = text(raw, fields::PRODUCT_NAME)
            .ok_or_else(|| ValidationError::missing(fields::PRODUCT_NAME))?;

        Ok(Product {
            name,
            concentration: text(raw, fields::CONCENTRATION),
            skin_types: self.split(raw, fields::SKIN_TYPE),
            key_ingredients: self.split(raw, fields::KEY_INGREDIENTS),
            benefits: self.split(raw, fields::BENEFITS),
            usage_instructions: text(raw, fields::HOW_TO_USE).unwrap_or_default(),
            side_effects: text(raw, fields::SIDE_EFFECTS),
            price: text(raw, fields::PRICE).unwrap_or_default(),
        })
    }

    fn split(&self, raw: &RawRecord, key: &str) -> Vec<String> {
        raw.get(key)
            .map(|value| {
                value
                    .split(self.separator)
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Trimmed value, `None` when absent or blank.
fn text(raw: &RawRecord, key: &str) -> Option<String> {
    raw.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Parses a JSON object into a raw record.
///
/// Numbers and booleans are stringified, arrays are comma-joined and nulls
/// dropped, so `{"price": 699, "skin_type": ["Oily", "Dry"]}` is accepted.
pub fn raw_record_from_json(text: &str) -> Result<RawRecord, ContentflowError> {
    let Value::Object(map) = serde_json::from_str::<Value>(text)? else {
        return Err(ContentflowError::Serialization(
            "product record must be a JSON object".to_string(),
        ));
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| scalar_text(&value).map(|v| (key, v)))
        .collect())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}
