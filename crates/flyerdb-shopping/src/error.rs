use thiserror::Error;

/// Errors from shopping-list assembly.
#[derive(Debug, Error)]
pub enum ShoppingError {
    /// The id was never assigned, or the cache belongs to a restarted process.
    #[error("recipe {0} not found; generate recipes first")]
    RecipeNotFound(String),

    #[error("no recipe ids provided")]
    NoRecipes,
}
