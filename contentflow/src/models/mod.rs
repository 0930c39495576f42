//! Domain models: the product record and the artifact produced by each stage.

mod comparison;
mod page_content;
mod product;
mod questions;

pub use comparison::{ComparisonPoint, ComparisonResult};
pub use page_content::{PageContent, UsageHighlights};
pub use product::{Product, ProductSummary};
pub use questions::{AnswerSet, CategorizedQuestion, GeneratedAnswer, QuestionSet};
