//! Question and answer artifacts.

use serde::{Deserialize, Serialize};

/// A user question tagged with a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedQuestion {
    /// Category from an open set ("Informational", "Usage", "Safety", ...).
    pub category: String,
    /// The question text.
    pub question: String,
    /// Ordering priority within the category, 1 is highest.
    #[serde(default = "default_priority")]
    pub priority: u32,
}

fn default_priority() -> u32 {
    1
}

impl CategorizedQuestion {
    /// Creates a new question.
    #[must_use]
    pub fn new(category: impl Into<String>, question: impl Into<String>, priority: u32) -> Self {
        Self {
            category: category.into(),
            question: question.into(),
            priority,
        }
    }
}

/// Ordered questions plus the distinct categories they use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Questions in presentation order.
    pub questions: Vec<CategorizedQuestion>,
    /// Distinct categories in first-seen order.
    pub categories: Vec<String>,
}

impl QuestionSet {
    /// Builds a set, deriving the category list from the questions.
    #[must_use]
    pub fn new(questions: Vec<CategorizedQuestion>) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for q in &questions {
            if !categories.contains(&q.category) {
                categories.push(q.category.clone());
            }
        }
        Self {
            questions,
            categories,
        }
    }

    /// Number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns true if there are no questions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Returns true if any question uses `category` (case-insensitive).
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}

/// One generated answer, paired by position with a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    /// The answer text.
    pub text: String,
}

impl GeneratedAnswer {
    /// Creates a new answer.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// All answers for a [`QuestionSet`], in question order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnswerSet {
    /// Answers in question order.
    pub answers: Vec<GeneratedAnswer>,
}

impl AnswerSet {
    /// Creates an answer set from raw strings.
    #[must_use]
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: texts.into_iter().map(GeneratedAnswer::new).collect(),
        }
    }

    /// Number of answers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Returns true if there are no answers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_distinct_in_first_seen_order() {
        let set = QuestionSet::new(vec![
            CategorizedQuestion::new("Usage", "How?", 1),
            CategorizedQuestion::new("Safety", "Safe?", 1),
            CategorizedQuestion::new("Usage", "When?", 2),
        ]);
        assert_eq!(set.categories, vec!["Usage".to_string(), "Safety".to_string()]);
        assert_eq!(set.len(), 3);
        assert!(set.has_category("usage"));
        assert!(!set.has_category("Purchase"));
    }

    #[test]
    fn test_priority_defaults_to_one() {
        let q: CategorizedQuestion =
            serde_json::from_str(r#"{"category":"Usage","question":"How?"}"#).unwrap();
        assert_eq!(q.priority, 1);
    }

    #[test]
    fn test_answer_set_from_texts() {
        let answers = AnswerSet::from_texts(["one", "two"]);
        assert_eq!(answers.len(), 2);
        assert_eq!(answers.answers[1].text, "two");
    }
}
