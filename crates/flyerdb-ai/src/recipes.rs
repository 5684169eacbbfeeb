//! Recipe generation from the current promotion set.

use serde::Deserialize;
use serde_json::json;

use flyerdb_core::{Promotion, Recipe};

use crate::client::OpenAiClient;
use crate::error::AiError;
use crate::extract::strip_code_fence;

const RECIPE_MODEL: &str = "gpt-3.5-turbo";
const RECIPE_MAX_TOKENS: u32 = 3000;
const RECIPE_TEMPERATURE: f64 = 0.7;
const RECIPE_SYSTEM_PROMPT: &str =
    "You are a helpful meal planning assistant that creates recipes based on grocery promotions.";

/// How many promotions are quoted in the prompt before it gets unwieldy.
const PROMPT_PROMOTION_LIMIT: usize = 30;

/// Caller preferences for a recipe generation run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePreferences {
    /// Free-text dietary constraint, e.g. `"vegetarian"`.
    #[serde(default)]
    pub dietary: Option<String>,
    /// People each recipe should serve; the prompt defaults to 4.
    #[serde(default)]
    pub servings: Option<u32>,
}

/// Generates `num_recipes` meal recipes built around the promoted items.
///
/// The first [`PROMPT_PROMOTION_LIMIT`] promotions are quoted in the prompt;
/// ingredient `on_sale` flags in the output mark which ingredients came from
/// that list. Recipe ids are left empty for the caller to assign.
///
/// # Errors
///
/// - [`AiError::Http`] / [`AiError::UnexpectedStatus`] /
///   [`AiError::EmptyResponse`] from the chat call.
/// - [`AiError::Deserialize`] if the response is not a recipe array; unlike
///   promotion extraction this propagates, because the caller owes its own
///   caller a structured error rather than a silently empty result.
pub async fn generate_recipes(
    client: &OpenAiClient,
    promotions: &[Promotion],
    num_recipes: u32,
    preferences: &RecipePreferences,
) -> Result<Vec<Recipe>, AiError> {
    let servings = preferences.servings.unwrap_or(4);
    let prompt = build_recipe_prompt(
        promotions,
        num_recipes,
        servings,
        preferences.dietary.as_deref(),
    );

    let body = json!({
        "model": RECIPE_MODEL,
        "messages": [
            { "role": "system", "content": RECIPE_SYSTEM_PROMPT },
            { "role": "user", "content": prompt }
        ],
        "max_tokens": RECIPE_MAX_TOKENS,
        "temperature": RECIPE_TEMPERATURE
    });

    let content = client.chat(&body).await?;
    let payload = strip_code_fence(&content);

    serde_json::from_str::<Vec<Recipe>>(payload).map_err(|e| {
        let prefix: String = content.chars().take(500).collect();
        tracing::warn!(error = %e, raw = %prefix, "recipe response was not a recipe array");
        AiError::Deserialize {
            context: "recipe generation response".to_string(),
            source: e,
        }
    })
}

fn format_promotion_lines(promotions: &[Promotion]) -> String {
    promotions
        .iter()
        .take(PROMPT_PROMOTION_LIMIT)
        .map(|p| {
            format!(
                "- {}: ${}/{} ({}) at {}",
                p.item, p.price, p.unit, p.discount, p.store
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_recipe_prompt(
    promotions: &[Promotion],
    num_recipes: u32,
    servings: u32,
    dietary: Option<&str>,
) -> String {
    let promotion_list = format_promotion_lines(promotions);
    let dietary_text = dietary
        .filter(|d| !d.is_empty())
        .map(|d| format!("Make the recipes {d}."))
        .unwrap_or_default();

    format!(
        r#"You are a meal planning assistant. Generate {num_recipes} recipes using primarily the following promoted grocery items:

Current Promotions:
{promotion_list}

Requirements:
- Use as many promoted items as possible to maximize savings
- Create complete, balanced meals
- Each recipe should serve {servings} people
- Include cooking time
{dietary_text}
- Return ONLY valid JSON

Output format (array of recipe objects):
[
  {{
    "name": "Recipe Name",
    "description": "Brief description of the dish",
    "ingredients": [
      {{"item": "Chicken breast", "amount": "1.5 lb", "on_sale": true}},
      {{"item": "Salt", "amount": "1 tsp", "on_sale": false}}
    ],
    "instructions": ["Step 1", "Step 2", "Step 3"],
    "cooking_time": "30 mins",
    "servings": {servings}
  }}
]

Important: Mark "on_sale": true for ingredients that are in the promotions list, false otherwise.
"#
    )
}
