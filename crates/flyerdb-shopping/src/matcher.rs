//! Shopping-list assembly: ingredient aggregation and promotion matching.

use flyerdb_core::{Promotion, Recipe, ShoppingList, ShoppingListItem};

use crate::cache::RecipeCache;
use crate::error::ShoppingError;

/// Assumed price for items without a matching promotion.
const PLACEHOLDER_PRICE: f64 = 5.0;
/// Flat savings estimate applied to matched sale prices.
const SAVINGS_RATE: f64 = 0.30;

/// Builds a priced shopping list from cached recipes.
///
/// Ingredients are aggregated by exact item name in first-occurrence order;
/// repeats concatenate their amounts with `" + "`. Each aggregated item is
/// then matched against `promotions` in slice order, first match wins, where
/// a match means either lowercased item name contains the other. Matched
/// items take the promotion price and `on_sale = true`; unmatched items take
/// the placeholder price and keep the recipe-supplied flag.
///
/// # Errors
///
/// - [`ShoppingError::NoRecipes`] if `recipe_ids` is empty.
/// - [`ShoppingError::RecipeNotFound`] on the first id the cache cannot
///   resolve.
pub async fn build_shopping_list(
    cache: &RecipeCache,
    recipe_ids: &[String],
    promotions: &[Promotion],
) -> Result<ShoppingList, ShoppingError> {
    if recipe_ids.is_empty() {
        return Err(ShoppingError::NoRecipes);
    }

    let mut recipes = Vec::with_capacity(recipe_ids.len());
    for id in recipe_ids {
        let recipe = cache
            .get(id)
            .await
            .ok_or_else(|| ShoppingError::RecipeNotFound(id.clone()))?;
        recipes.push(recipe);
    }

    let items = aggregate_ingredients(&recipes);
    tracing::debug!(
        recipes = recipes.len(),
        items = items.len(),
        "aggregated shopping list items"
    );
    Ok(price_items(items, promotions))
}

struct AggregatedIngredient {
    item: String,
    amount: String,
    on_sale: bool,
}

/// Collapses repeated ingredients across recipes by exact item name.
///
/// Amounts are free text with mixed units, so repeats concatenate with
/// `" + "` rather than summing. The `on_sale` flag comes from the first
/// occurrence.
fn aggregate_ingredients(recipes: &[Recipe]) -> Vec<AggregatedIngredient> {
    let mut items: Vec<AggregatedIngredient> = Vec::new();
    for recipe in recipes {
        for ingredient in &recipe.ingredients {
            if let Some(existing) = items.iter_mut().find(|i| i.item == ingredient.item) {
                existing.amount.push_str(" + ");
                existing.amount.push_str(&ingredient.amount);
            } else {
                items.push(AggregatedIngredient {
                    item: ingredient.item.clone(),
                    amount: ingredient.amount.clone(),
                    on_sale: ingredient.on_sale,
                });
            }
        }
    }
    items
}

fn price_items(items: Vec<AggregatedIngredient>, promotions: &[Promotion]) -> ShoppingList {
    let mut shopping_list = Vec::with_capacity(items.len());
    let mut total_cost = 0.0;
    let mut estimated_savings = 0.0;

    for ingredient in items {
        let item_lower = ingredient.item.to_lowercase();
        let matched = promotions.iter().find(|promo| {
            let promo_lower = promo.item.to_lowercase();
            item_lower.contains(&promo_lower) || promo_lower.contains(&item_lower)
        });

        let (price, on_sale) = match matched {
            Some(promo) => {
                tracing::debug!(
                    item = %ingredient.item,
                    promotion = %promo.item,
                    price = promo.price,
                    "matched promotion"
                );
                estimated_savings += promo.price * SAVINGS_RATE;
                (promo.price, true)
            }
            None => (PLACEHOLDER_PRICE, ingredient.on_sale),
        };
        total_cost += price;

        shopping_list.push(ShoppingListItem {
            item: ingredient.item,
            amount: ingredient.amount,
            on_sale,
            price,
        });
    }

    ShoppingList {
        shopping_list,
        total_cost: round2(total_cost),
        estimated_savings: round2(estimated_savings),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
