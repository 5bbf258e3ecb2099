use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use super::Recipe;

const BUILTIN_RECIPES_JSON: &str = include_str!("../../data/recipes.json");

const MAX_RATING: f32 = 5.0;

/// The catalog bundled with the binary.
pub fn builtin_recipes() -> Result<Vec<Recipe>> {
    parse_recipes(BUILTIN_RECIPES_JSON).context("Failed to load built-in recipe catalog")
}

pub fn load_recipes_from_path(json_path: &Path) -> Result<Vec<Recipe>> {
    if !json_path.exists() {
        return Err(anyhow::anyhow!("Recipe catalog not found at: {:?}", json_path));
    }

    let content = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read recipe catalog at {:?}", json_path))?;
    parse_recipes(&content).with_context(|| format!("Invalid recipe catalog at {:?}", json_path))
}

/// Parses a JSON array of recipes and checks the invariants the scorer and rescaler rely on.
pub fn parse_recipes(json: &str) -> Result<Vec<Recipe>> {
    let recipes: Vec<Recipe> = serde_json::from_str(json).context("Malformed recipe JSON")?;

    if recipes.is_empty() {
        return Err(anyhow::anyhow!("No recipes found in catalog"));
    }

    let mut seen_ids = HashSet::new();
    for recipe in &recipes {
        if !seen_ids.insert(recipe.id) {
            return Err(anyhow::anyhow!("Duplicate recipe id {}", recipe.id));
        }
        if recipe.ingredients.is_empty() {
            return Err(anyhow::anyhow!("Recipe {} ('{}') has no ingredients", recipe.id, recipe.name));
        }
        if recipe.servings == 0 {
            return Err(anyhow::anyhow!("Recipe {} ('{}') has zero servings", recipe.id, recipe.name));
        }
        if recipe.cooking_time == 0 {
            return Err(anyhow::anyhow!("Recipe {} ('{}') has zero cooking time", recipe.id, recipe.name));
        }
        if !(0.0..=MAX_RATING).contains(&recipe.rating) {
            return Err(anyhow::anyhow!(
                "Recipe {} ('{}') has rating {} outside 0-{}",
                recipe.id,
                recipe.name,
                recipe.rating,
                MAX_RATING
            ));
        }
    }

    tracing::debug!(count = recipes.len(), "Recipe catalog parsed");
    Ok(recipes)
}
