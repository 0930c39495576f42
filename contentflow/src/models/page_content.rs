//! Product page copy artifact.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marketing copy for the product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// Short tagline.
    pub tagline: String,
    /// Two or three sentence description.
    pub description: String,
    /// Feature bullets.
    pub key_features: Vec<String>,
    /// Safety precautions.
    pub precautions: Vec<String>,
    /// Per-ingredient one-liners, when the generator supplied them.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ingredient_descriptions: BTreeMap<String, String>,
    /// Usage details, when the generator supplied them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_highlights: Option<UsageHighlights>,
    /// Guidance for sensitive skin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive_skin_note: Option<String>,
}

/// Structured usage guidance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageHighlights {
    /// Morning, evening or as directed.
    #[serde(default)]
    pub timing: String,
    /// How much to apply.
    #[serde(default)]
    pub application_amount: String,
    /// Where it goes in a routine.
    #[serde(default)]
    pub application_order: String,
    /// How often.
    #[serde(default)]
    pub frequency: String,
    /// Extra tips.
    #[serde(default)]
    pub tips: String,
}
