use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use flyerdb_ai::RecipePreferences;
use flyerdb_core::{Recipe, ShoppingList};
use flyerdb_shopping::ShoppingError;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct GenerateRequest {
    #[serde(default = "default_num_recipes")]
    pub num_recipes: u32,
    #[serde(default)]
    pub preferences: RecipePreferences,
}

fn default_num_recipes() -> u32 {
    5
}

#[derive(Debug, Serialize)]
pub(super) struct RecipesData {
    pub recipes: Vec<Recipe>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub(super) struct ShoppingListRequest {
    #[serde(default)]
    pub recipe_ids: Vec<String>,
}

/// `POST /api/v1/recipes/generate` — generate recipes from the current
/// promotion set and cache them for shopping-list requests.
pub(super) async fn generate_recipes(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<RecipesData>>, ApiError> {
    let promotions = flyerdb_db::current_promotions(&state.pool, &state.pipeline.artifacts_dir)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    if promotions.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "no_promotions",
            "no promotions available; run a scrape first",
        ));
    }

    let recipes = flyerdb_ai::generate_recipes(
        &state.deps.ai,
        &promotions,
        request.num_recipes,
        &request.preferences,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "recipe generation failed");
        ApiError::new(req_id.0.clone(), "recipe_generation_failed", e.to_string())
    })?;

    let recipes = state.recipes.put_all(recipes).await;
    let count = recipes.len();
    Ok(Json(ApiResponse {
        data: RecipesData { recipes, count },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `POST /api/v1/shopping-list` — build a priced list from cached recipes.
pub(super) async fn create_shopping_list(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ShoppingListRequest>,
) -> Result<Json<ApiResponse<ShoppingList>>, ApiError> {
    let promotions = flyerdb_db::current_promotions(&state.pool, &state.pipeline.artifacts_dir)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let list =
        flyerdb_shopping::build_shopping_list(&state.recipes, &request.recipe_ids, &promotions)
            .await
            .map_err(|e| match e {
                ShoppingError::NoRecipes => {
                    ApiError::new(req_id.0.clone(), "bad_request", e.to_string())
                }
                ShoppingError::RecipeNotFound(_) => {
                    ApiError::new(req_id.0.clone(), "recipe_not_found", e.to_string())
                }
            })?;

    Ok(Json(ApiResponse {
        data: list,
        meta: ResponseMeta::new(req_id.0),
    }))
}
