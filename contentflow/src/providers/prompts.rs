//! Prompt construction for each content stage.

use std::fmt::Write as _;

use crate::core::StageName;
use crate::models::{Product, QuestionSet};

use super::GenerationRequest;

fn join(items: &[String]) -> String {
    if items.is_empty() {
        "Not specified".to_string()
    } else {
        items.join(", ")
    }
}

/// The product facts block shared by every prompt.
#[must_use]
pub fn product_details(product: &Product) -> String {
    format!(
        "Name: {}\nConcentration: {}\nSkin Types: {}\nIngredients: {}\nBenefits: {}\nUsage: {}\nSide Effects: {}\nPrice: {}",
        product.name,
        product.concentration.as_deref().unwrap_or("Not specified"),
        join(&product.skin_types),
        join(&product.key_ingredients),
        join(&product.benefits),
        if product.usage_instructions.is_empty() {
            "Not specified"
        } else {
            product.usage_instructions.as_str()
        },
        product.side_effects.as_deref().unwrap_or("None reported"),
        if product.price.is_empty() {
            "Not specified"
        } else {
            product.price.as_str()
        },
    )
}

/// Asks for 20 categorized questions as a JSON array.
#[must_use]
pub fn questions(product: &Product) -> GenerationRequest {
    let system = format!(
        r#"You are an expert at generating realistic user questions about skincare products.

Generate exactly 20 diverse questions across these categories:
- Informational (4 questions): What is it, what does it do, key features
- Usage (3 questions): How to use, when to apply, application tips
- Safety (3 questions): Side effects, precautions, skin sensitivity
- Skin Type (3 questions): Suitability for different skin types
- Purchase (3 questions): Price, where to buy, value assessment
- Comparison (2 questions): How it compares to competitors
- Results (2 questions): Expected outcomes, timeline

Generate natural, conversational questions a real user would ask.

Return ONLY a JSON array with this exact structure:
[
  {{"category": "Informational", "question": "What is the product?", "priority": 1}},
  {{"category": "Usage", "question": "How do I use it?", "priority": 1}}
]

Product Details:
{}"#,
        product_details(product)
    );
    GenerationRequest::new(
        StageName::Questions,
        system,
        "Generate 20 diverse questions. Return ONLY the JSON array, no other text.",
    )
}

/// Asks for answers to every question in one batch.
#[must_use]
pub fn answers(product: &Product, questions: &QuestionSet) -> GenerationRequest {
    let system = format!(
        r#"You are a knowledgeable skincare expert providing helpful, accurate answers about products.

Generate answers for ALL questions below based ONLY on the provided product information.

Product Details:
{}

Guidelines:
- Each answer should be 2-3 sentences max
- Be conversational but professional
- Answer directly without fluff
- Use specific product details from above

Return JSON array with this structure, one entry per question, in the same order:
[
  {{"question": "question text 1", "answer": "answer text 1"}},
  {{"question": "question text 2", "answer": "answer text 2"}}
]

IMPORTANT: Return ONLY the JSON array, no additional text."#,
        product_details(product)
    );

    let mut user = String::from("Generate answers for these questions:\n\n");
    for (i, q) in questions.questions.iter().enumerate() {
        let _ = writeln!(user, "{}. [{}] {}", i + 1, q.category, q.question);
    }
    GenerationRequest::new(StageName::Answers, system, user)
}

/// Asks for a fictional competitor plus a 7-point comparison.
#[must_use]
pub fn comparison(product: &Product) -> GenerationRequest {
    let system = format!(
        r#"You are an expert skincare product analyst.

Generate a realistic fictional competing product AND a comparison analysis in ONE response.

The competitor must have a different brand name, a comparable but distinct
formulation (different concentration or price), 3-5 key ingredients and 2-4 benefits.

Generate exactly 7 comparison points: Price & Value, Active Ingredient Concentration,
Ingredient Complexity, Targeted Skin Types, Claimed Benefits, Usage Convenience,
Overall Market Positioning. Give values for both products and a winner (or "Tie").

Return ONLY this JSON structure:
{{
  "competitor": {{
    "name": "Competitor product name",
    "concentration": "X%",
    "skin_types": ["Type1", "Type2"],
    "key_ingredients": ["Ingredient1", "Ingredient2", "Ingredient3"],
    "benefits": ["Benefit1", "Benefit2"],
    "price": "XXX"
  }},
  "comparison_points": [
    {{"attribute": "Price & Value", "product_a": "value", "product_b": "value", "winner": "Product Name"}}
  ],
  "summary": {{
    "winner": "Product that wins most comparison points",
    "key_differences": "1-2 sentence summary of the main differences"
  }},
  "recommendation": "One sentence recommending which product to choose and for whom"
}}

Original Product to Compare Against:
{}"#,
        product_details(product)
    );
    GenerationRequest::new(
        StageName::Comparison,
        system,
        "Generate the competitor and comparison. Return ONLY the JSON.",
    )
}

/// Asks for product page copy.
#[must_use]
pub fn page_content(product: &Product) -> GenerationRequest {
    let system = format!(
        r#"You are a professional skincare copywriter. Generate compelling product page content based on the product details provided.

Product Information:
{}

Generate a JSON response with:
{{
  "tagline": "catchy tagline (max 10 words)",
  "description": "compelling 2-3 sentence product description",
  "key_features": ["feature 1", "feature 2", "feature 3", "feature 4"],
  "ingredient_descriptions": {{"Ingredient Name": "1 sentence description"}},
  "usage_highlights": {{
    "timing": "when to use (morning/evening/both)",
    "application_amount": "how much to use",
    "application_order": "when in routine",
    "frequency": "how often",
    "tips": "application tips"
  }},
  "precautions": ["precaution 1", "precaution 2", "precaution 3"],
  "suitable_for_sensitive_skin": "yes/no/with caution + brief explanation"
}}

Base all content on the provided data only. Return ONLY the JSON, no additional text."#,
        product_details(product)
    );
    GenerationRequest::new(
        StageName::PageContent,
        system,
        format!("Generate product page content for {}", product.name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategorizedQuestion;
    use crate::testing::sample_product;

    #[test]
    fn test_product_details_block() {
        let details = product_details(&sample_product());
        assert!(details.contains("Name: GlowBoost Vitamin C Serum"));
        assert!(details.contains("Ingredients: Vitamin C, Hyaluronic Acid"));
        assert!(details.contains("Price: 699"));
    }

    #[test]
    fn test_missing_fields_render_placeholders() {
        let details = product_details(&Product::named("Bare"));
        assert!(details.contains("Skin Types: Not specified"));
        assert!(details.contains("Side Effects: None reported"));
    }

    #[test]
    fn test_requests_are_tagged_with_stage() {
        let product = sample_product();
        assert_eq!(questions(&product).stage, StageName::Questions);
        assert_eq!(comparison(&product).stage, StageName::Comparison);
        assert_eq!(page_content(&product).stage, StageName::PageContent);
        assert!(page_content(&product).user.contains("GlowBoost"));
    }

    #[test]
    fn test_answers_prompt_lists_questions() {
        let set = QuestionSet::new(vec![
            CategorizedQuestion::new("Usage", "How do I apply it?", 1),
            CategorizedQuestion::new("Safety", "Is it safe?", 1),
        ]);
        let request = answers(&sample_product(), &set);
        assert_eq!(request.stage, StageName::Answers);
        assert!(request.user.contains("1. [Usage] How do I apply it?"));
        assert!(request.user.contains("2. [Safety] Is it safe?"));
    }
}
