//! Parsing generator output into stage artifacts.
//!
//! Generators are asked for bare JSON but often wrap it in prose or code
//! fences. [`extract_json`] pulls out the first JSON value; the per-stage
//! parsers then map the loose wire shape onto the typed artifacts.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::GenerationError;
use crate::models::{
    AnswerSet, CategorizedQuestion, ComparisonPoint, ComparisonResult, GeneratedAnswer,
    PageContent, Product, QuestionSet, UsageHighlights,
};

/// Extracts the first JSON object or array from generator text.
pub fn extract_json(text: &str) -> Result<Value, GenerationError> {
    let start = text
        .find(['{', '['])
        .ok_or_else(|| GenerationError::parse("no JSON value in response"))?;

    let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(GenerationError::parse(format!("invalid JSON: {e}"))),
        None => Err(GenerationError::parse("empty JSON value")),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(value: Value, what: &str) -> Result<T, GenerationError> {
    serde_json::from_value(value).map_err(|e| GenerationError::parse(format!("{what}: {e}")))
}

/// Renders scalars as text; arrays are comma-joined.
fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(text_of)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Unwraps `{"<key>": [...]}` envelopes.
fn unwrap_list(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    }
}

#[derive(Debug, Deserialize)]
struct WireQuestion {
    #[serde(default)]
    category: String,
    question: String,
    #[serde(default = "default_priority")]
    priority: u32,
}

fn default_priority() -> u32 {
    1
}

/// Parses a question list.
pub fn questions(text: &str) -> Result<QuestionSet, GenerationError> {
    let value = unwrap_list(extract_json(text)?, "questions");
    let wire: Vec<WireQuestion> = decode(value, "questions")?;
    Ok(QuestionSet::new(
        wire.into_iter()
            .map(|q| CategorizedQuestion::new(q.category.trim(), q.question.trim(), q.priority))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireAnswer {
    Pair {
        answer: Value,
    },
    Text(String),
}

/// Parses a batched answer list, paired positionally with the questions.
pub fn answers(text: &str) -> Result<AnswerSet, GenerationError> {
    let value = unwrap_list(extract_json(text)?, "answers");
    let wire: Vec<WireAnswer> = decode(value, "answers")?;
    Ok(AnswerSet {
        answers: wire
            .into_iter()
            .map(|a| match a {
                WireAnswer::Pair { answer } => GeneratedAnswer::new(text_of(&answer)),
                WireAnswer::Text(text) => GeneratedAnswer::new(text.trim()),
            })
            .collect(),
    })
}

#[derive(Debug, Deserialize)]
struct WireCompetitor {
    #[serde(default)]
    name: Value,
    #[serde(default)]
    concentration: Value,
    #[serde(default)]
    skin_types: Vec<String>,
    #[serde(default, alias = "ingredients")]
    key_ingredients: Vec<String>,
    #[serde(default)]
    benefits: Vec<String>,
    #[serde(default, alias = "how_to_use")]
    usage_instructions: Value,
    #[serde(default)]
    side_effects: Value,
    #[serde(default)]
    price: Value,
}

impl WireCompetitor {
    fn into_product(self) -> Product {
        let optional = |v: &Value| Some(text_of(v)).filter(|s| !s.is_empty());
        Product {
            name: text_of(&self.name),
            concentration: optional(&self.concentration),
            skin_types: self.skin_types,
            key_ingredients: self.key_ingredients,
            benefits: self.benefits,
            usage_instructions: text_of(&self.usage_instructions),
            side_effects: optional(&self.side_effects),
            price: text_of(&self.price),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePoint {
    #[serde(alias = "attribute", alias = "aspect")]
    dimension: String,
    #[serde(default, alias = "product_a")]
    value_a: Value,
    #[serde(default, alias = "product_b")]
    value_b: Value,
    #[serde(default)]
    winner: Value,
}

#[derive(Debug, Deserialize)]
struct WireComparison {
    #[serde(alias = "product_b")]
    competitor: WireCompetitor,
    #[serde(default)]
    comparison_points: Vec<WirePoint>,
    #[serde(default)]
    summary: Value,
    #[serde(default)]
    recommendation: Value,
}

/// Parses a competitor plus comparison for `product`.
pub fn comparison(text: &str, product: &Product) -> Result<ComparisonResult, GenerationError> {
    let wire: WireComparison = decode(extract_json(text)?, "comparison")?;

    let summary = match wire.summary {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), text_of(v)))
            .filter(|(_, v)| !v.is_empty())
            .collect(),
        Value::Null => BTreeMap::new(),
        other => {
            let mut map = BTreeMap::new();
            let text = text_of(&other);
            if !text.is_empty() {
                map.insert("key_differences".to_string(), text);
            }
            map
        }
    };

    Ok(ComparisonResult {
        product_a: product.clone(),
        product_b: wire.competitor.into_product(),
        comparison_points: wire
            .comparison_points
            .into_iter()
            .map(|p| {
                let point = ComparisonPoint::new(p.dimension.trim(), text_of(&p.value_a), text_of(&p.value_b));
                match text_of(&p.winner) {
                    w if w.is_empty() => point,
                    w => point.with_winner(w),
                }
            })
            .collect(),
        summary,
        recommendation: text_of(&wire.recommendation),
    })
}

#[derive(Debug, Deserialize)]
struct WirePage {
    #[serde(default)]
    tagline: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    key_features: Vec<String>,
    #[serde(default)]
    precautions: Vec<String>,
    #[serde(default)]
    ingredient_descriptions: BTreeMap<String, Value>,
    #[serde(default)]
    usage_highlights: Option<UsageHighlights>,
    #[serde(default, alias = "sensitive_skin_note")]
    suitable_for_sensitive_skin: Value,
}

/// Parses product page copy.
pub fn page_content(text: &str) -> Result<PageContent, GenerationError> {
    let wire: WirePage = decode(extract_json(text)?, "page content")?;
    let note = text_of(&wire.suitable_for_sensitive_skin);
    Ok(PageContent {
        tagline: wire.tagline.trim().to_string(),
        description: wire.description.trim().to_string(),
        key_features: wire.key_features,
        precautions: wire.precautions,
        ingredient_descriptions: wire
            .ingredient_descriptions
            .iter()
            .map(|(k, v)| (k.clone(), text_of(v)))
            .collect(),
        usage_highlights: wire.usage_highlights,
        sensitive_skin_note: Some(note).filter(|n| !n.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_product;

    #[test]
    fn test_extract_json_from_fenced_block() {
        let text = "Here you go:\n```json\n[{\"a\": 1}]\n```\nEnjoy!";
        assert_eq!(extract_json(text).unwrap(), serde_json::json!([{"a": 1}]));
    }

    #[test]
    fn test_extract_json_without_json() {
        assert_eq!(extract_json("no json here").unwrap_err().kind(), "parse");
        assert_eq!(extract_json("{ broken").unwrap_err().kind(), "parse");
    }

    #[test]
    fn test_parse_questions() {
        let text = r#"[
            {"category": "Informational", "question": "What is it?", "priority": 1},
            {"category": "Usage", "question": " How do I use it? "}
        ]"#;
        let set = questions(text).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.questions[1].question, "How do I use it?");
        assert_eq!(set.questions[1].priority, 1);
        assert_eq!(set.categories, vec!["Informational", "Usage"]);
    }

    #[test]
    fn test_parse_questions_envelope() {
        let set = questions(r#"{"questions": [{"category": "Safety", "question": "Safe?"}]}"#).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_parse_questions_wrong_shape() {
        assert_eq!(questions(r#"{"foo": 1}"#).unwrap_err().kind(), "parse");
    }

    #[test]
    fn test_parse_answers_pairs_and_strings() {
        let text = r#"[{"question": "Q1?", "answer": "First answer."}, "Second answer."]"#;
        let set = answers(text).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.answers[0].text, "First answer.");
        assert_eq!(set.answers[1].text, "Second answer.");
    }

    #[test]
    fn test_parse_comparison() {
        let text = r#"```json
        {
          "competitor": {
            "name": "RadiantC Pro Serum",
            "concentration": "15% Vitamin C",
            "skin_types": ["Normal", "Dry"],
            "key_ingredients": ["Vitamin C", "Vitamin E", "Ferulic Acid"],
            "benefits": ["Brightening", "Anti-aging"],
            "price": 899
          },
          "comparison_points": [
            {"attribute": "Price & Value", "product_a": "₹699", "product_b": "₹899", "winner": "GlowBoost"},
            {"attribute": "Concentration", "product_a": "10%", "product_b": "15%"}
          ],
          "summary": {"winner": "GlowBoost", "key_differences": "Cheaper vs stronger."},
          "recommendation": "Choose GlowBoost for value."
        }
        ```"#;
        let result = comparison(text, &sample_product()).unwrap();
        assert_eq!(result.product_a, sample_product());
        assert_eq!(result.product_b.name, "RadiantC Pro Serum");
        assert_eq!(result.product_b.price, "899");
        assert_eq!(result.comparison_points.len(), 2);
        assert_eq!(result.comparison_points[0].dimension, "Price & Value");
        assert_eq!(result.comparison_points[0].winner.as_deref(), Some("GlowBoost"));
        assert!(result.comparison_points[1].winner.is_none());
        assert_eq!(result.summary.get("winner").map(String::as_str), Some("GlowBoost"));
        assert_eq!(result.recommendation, "Choose GlowBoost for value.");
    }

    #[test]
    fn test_parse_comparison_requires_competitor() {
        let err = comparison(r#"{"comparison_points": []}"#, &sample_product()).unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_parse_page_content() {
        let text = r#"{
            "tagline": "Glow brighter every night",
            "description": "A serum.",
            "key_features": ["a", "b", "c"],
            "ingredient_descriptions": {"Vitamin C": "Brightens."},
            "usage_highlights": {"timing": "evening", "full_instructions": "Apply at night"},
            "precautions": ["Patch test", "Avoid eyes"],
            "suitable_for_sensitive_skin": "with caution"
        }"#;
        let page = page_content(text).unwrap();
        assert_eq!(page.tagline, "Glow brighter every night");
        assert_eq!(page.key_features.len(), 3);
        assert_eq!(page.ingredient_descriptions["Vitamin C"], "Brightens.");
        assert_eq!(page.usage_highlights.unwrap().timing, "evening");
        assert_eq!(page.sensitive_skin_note.as_deref(), Some("with caution"));
    }
}
