//! In-memory store for generated recipes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use flyerdb_core::Recipe;

#[derive(Default)]
struct CacheInner {
    recipes: HashMap<String, Recipe>,
    counter: u64,
}

/// Process-lifetime recipe store, keyed by assigned id.
///
/// Ids are `recipe_{n}` from a counter that only moves forward, so ids from
/// earlier generations stay resolvable until the process restarts. Clones
/// share the same underlying map.
#[derive(Clone, Default)]
pub struct RecipeCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl RecipeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores one recipe, assigning and returning its id.
    pub async fn put(&self, mut recipe: Recipe) -> String {
        let mut inner = self.inner.lock().await;
        inner.counter += 1;
        let id = format!("recipe_{}", inner.counter);
        recipe.id = id.clone();
        inner.recipes.insert(id.clone(), recipe);
        id
    }

    /// Stores a generation of recipes under one lock, returning them with
    /// their assigned ids filled in.
    pub async fn put_all(&self, recipes: Vec<Recipe>) -> Vec<Recipe> {
        let mut inner = self.inner.lock().await;
        let mut stored = Vec::with_capacity(recipes.len());
        for mut recipe in recipes {
            inner.counter += 1;
            let id = format!("recipe_{}", inner.counter);
            recipe.id = id.clone();
            inner.recipes.insert(id, recipe.clone());
            stored.push(recipe);
        }
        stored
    }

    pub async fn get(&self, id: &str) -> Option<Recipe> {
        self.inner.lock().await.recipes.get(id).cloned()
    }
}
