use thiserror::Error;

/// Errors from loading or validating application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stores file at {path}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stores file")]
    StoresFileParse(#[from] serde_yaml::Error),

    #[error("invalid stores configuration: {0}")]
    Validation(String),
}

mod app_config;
mod config;
mod promotions;
mod recipes;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use promotions::{Promotion, StorePromotionsDoc};
pub use recipes::{Recipe, RecipeIngredient, ShoppingList, ShoppingListItem};
