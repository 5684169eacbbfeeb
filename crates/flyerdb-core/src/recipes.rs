use serde::{Deserialize, Serialize};

/// One ingredient line of a generated recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub item: String,
    /// Free-text quantity, e.g. `"2 cloves"`, `"500g"`.
    pub amount: String,
    /// Whether the generator flagged this ingredient as currently promoted.
    #[serde(default)]
    pub on_sale: bool,
}

/// A generated meal recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Assigned at cache insertion (`recipe_1`, `recipe_2`, ...); empty until cached.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub cooking_time: String,
    #[serde(default = "default_servings")]
    pub servings: u32,
}

fn default_servings() -> u32 {
    4
}

/// One aggregated line of a priced shopping list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub item: String,
    /// Amounts from repeated ingredients are joined with `" + "`, never summed.
    pub amount: String,
    pub on_sale: bool,
    pub price: f64,
}

/// A priced shopping list built from selected recipes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub shopping_list: Vec<ShoppingListItem>,
    pub total_cost: f64,
    pub estimated_savings: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_parses_generator_output_without_id() {
        let raw = r#"{
            "name": "Garlic Chicken",
            "description": "Simple weeknight dinner",
            "ingredients": [
                {"item": "Chicken", "amount": "500g", "on_sale": true},
                {"item": "Garlic", "amount": "3 cloves", "on_sale": false}
            ],
            "instructions": ["Season the chicken.", "Roast 40 minutes."],
            "cooking_time": "50 minutes",
            "servings": 4
        }"#;
        let recipe: Recipe = serde_json::from_str(raw).expect("deserialization failed");
        assert_eq!(recipe.id, "");
        assert_eq!(recipe.name, "Garlic Chicken");
        assert_eq!(recipe.ingredients.len(), 2);
        assert!(recipe.ingredients[0].on_sale);
        assert_eq!(recipe.servings, 4);
    }

    #[test]
    fn recipe_defaults_for_sparse_generator_output() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"name": "Toast", "ingredients": [{"item": "Bread", "amount": "2 slices"}]}"#,
        )
        .expect("deserialization failed");
        assert_eq!(recipe.description, "");
        assert!(recipe.instructions.is_empty());
        assert_eq!(recipe.cooking_time, "");
        assert_eq!(recipe.servings, 4);
        assert!(!recipe.ingredients[0].on_sale);
    }

    #[test]
    fn shopping_list_serializes_expected_keys() {
        let list = ShoppingList {
            shopping_list: vec![ShoppingListItem {
                item: "Garlic".to_string(),
                amount: "3 cloves + 2 cloves".to_string(),
                on_sale: false,
                price: 5.0,
            }],
            total_cost: 5.0,
            estimated_savings: 0.0,
        };
        let value = serde_json::to_value(&list).unwrap();
        assert!(value.get("shopping_list").is_some());
        assert!(value.get("total_cost").is_some());
        assert!(value.get("estimated_savings").is_some());
        assert_eq!(value["shopping_list"][0]["amount"], "3 cloves + 2 cloves");
    }
}
