pub mod client;
pub mod error;
pub mod extract;
pub mod recipes;

pub use client::OpenAiClient;
pub use error::AiError;
pub use extract::{analyze_store, extract_promotions};
pub use recipes::{generate_recipes, RecipePreferences};
