pub mod cache;
pub mod error;
pub mod matcher;

pub use cache::RecipeCache;
pub use error::ShoppingError;
pub use matcher::build_shopping_list;
