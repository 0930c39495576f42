//! Comparison artifact.

use super::Product;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One compared dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    /// What is compared, e.g. "Price".
    pub dimension: String,
    /// Value for the original product.
    pub value_a: String,
    /// Value for the competitor.
    pub value_b: String,
    /// Product name that wins this dimension, "Tie", or a note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

impl ComparisonPoint {
    /// Creates a point without a winner.
    #[must_use]
    pub fn new(
        dimension: impl Into<String>,
        value_a: impl Into<String>,
        value_b: impl Into<String>,
    ) -> Self {
        Self {
            dimension: dimension.into(),
            value_a: value_a.into(),
            value_b: value_b.into(),
            winner: None,
        }
    }

    /// Sets the winner.
    #[must_use]
    pub fn with_winner(mut self, winner: impl Into<String>) -> Self {
        self.winner = Some(winner.into());
        self
    }
}

/// A product, a synthetic competitor, and how they compare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Snapshot of the input product.
    pub product_a: Product,
    /// Synthetic competitor.
    pub product_b: Product,
    /// Compared dimensions in presentation order.
    pub comparison_points: Vec<ComparisonPoint>,
    /// Free-form summary entries.
    pub summary: BTreeMap<String, String>,
    /// One-sentence recommendation.
    pub recommendation: String,
}
