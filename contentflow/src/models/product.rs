//! The canonical product record.

use serde::{Deserialize, Serialize};

/// Canonical representation of one product.
///
/// Built once by [`crate::record::RecordBuilder`] and never mutated during a
/// run; stages share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product name, never empty.
    pub name: String,
    /// Active ingredient concentration, e.g. "10% Vitamin C".
    #[serde(default)]
    pub concentration: Option<String>,
    /// Compatible skin types.
    #[serde(default)]
    pub skin_types: Vec<String>,
    /// Key ingredients.
    #[serde(default)]
    pub key_ingredients: Vec<String>,
    /// Product benefits.
    #[serde(default)]
    pub benefits: Vec<String>,
    /// How to use the product.
    #[serde(default)]
    pub usage_instructions: String,
    /// Known side effects.
    #[serde(default)]
    pub side_effects: Option<String>,
    /// Free-form price text, not parsed numerically here.
    #[serde(default)]
    pub price: String,
}

impl Product {
    /// Creates a product with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            concentration: None,
            skin_types: Vec::new(),
            key_ingredients: Vec::new(),
            benefits: Vec::new(),
            usage_instructions: String::new(),
            side_effects: None,
            price: String::new(),
        }
    }

    /// Concentration text, empty when unknown.
    #[must_use]
    pub fn concentration_text(&self) -> &str {
        self.concentration.as_deref().unwrap_or("")
    }

    /// First listed benefit.
    #[must_use]
    pub fn primary_benefit(&self) -> Option<&str> {
        self.benefits.first().map(String::as_str)
    }

    /// First listed key ingredient.
    #[must_use]
    pub fn primary_ingredient(&self) -> Option<&str> {
        self.key_ingredients.first().map(String::as_str)
    }

    /// Returns true if the side effects mention sensitive skin.
    #[must_use]
    pub fn mentions_sensitive_skin(&self) -> bool {
        self.side_effects
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains("sensitive"))
    }

    /// The fields shown on comparison pages.
    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            name: self.name.clone(),
            concentration: self.concentration.clone(),
            skin_types: self.skin_types.clone(),
            key_ingredients: self.key_ingredients.clone(),
            benefits: self.benefits.clone(),
            price: self.price.clone(),
        }
    }
}

/// Public subset of a [`Product`] used in comparison documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Product name.
    pub name: String,
    /// Concentration, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration: Option<String>,
    /// Compatible skin types.
    pub skin_types: Vec<String>,
    /// Key ingredients.
    pub key_ingredients: Vec<String>,
    /// Benefits.
    pub benefits: Vec<String>,
    /// Price text.
    pub price: String,
}
