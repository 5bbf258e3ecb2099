use serde::{Deserialize, Serialize};

use super::normalize::ingredient_matches;
use crate::recipes::{DietaryTag, Difficulty, Recipe};

/// Narrowing criteria for a search. All set criteria must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    /// Every listed tag must be present on the recipe.
    #[serde(default)]
    pub dietary: Vec<DietaryTag>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Upper bound in minutes. `Some(0)` is treated as unset.
    #[serde(default)]
    pub max_cooking_time: Option<u32>,
    /// Exact cuisine tag. An empty string is treated as unset.
    #[serde(default)]
    pub cuisine: Option<String>,
}

impl SearchFilters {
    pub fn accepts(&self, recipe: &Recipe) -> bool {
        if !self.dietary.iter().all(|tag| recipe.has_dietary(*tag)) {
            return false;
        }
        if let Some(difficulty) = self.difficulty {
            if recipe.difficulty != difficulty {
                return false;
            }
        }
        if let Some(max_time) = self.max_cooking_time.filter(|t| *t > 0) {
            if recipe.cooking_time > max_time {
                return false;
            }
        }
        if let Some(cuisine) = self.cuisine.as_deref().filter(|c| !c.is_empty()) {
            if recipe.cuisine != cuisine {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub match_score: f64,
    pub matched_ingredients: Vec<String>,
    pub missing_ingredients: Vec<String>,
}

fn is_covered<S: AsRef<str>>(ingredient_name: &str, user_ingredients: &[S]) -> bool {
    user_ingredients
        .iter()
        .any(|term| ingredient_matches(term.as_ref(), ingredient_name))
}

/// Fraction of the recipe's ingredients covered by at least one user ingredient.
///
/// Returns 0 when the user supplied nothing or the recipe lists no ingredients.
pub fn score_recipe<S: AsRef<str>>(recipe: &Recipe, user_ingredients: &[S]) -> f64 {
    if user_ingredients.is_empty() || recipe.ingredients.is_empty() {
        return 0.0;
    }
    let matched = recipe
        .ingredients
        .iter()
        .filter(|ingredient| is_covered(&ingredient.name, user_ingredients))
        .count();
    matched as f64 / recipe.ingredients.len() as f64
}

fn score_one<S: AsRef<str>>(recipe: &Recipe, user_ingredients: &[S]) -> ScoredRecipe {
    let (matched, missing): (Vec<_>, Vec<_>) = recipe
        .ingredients
        .iter()
        .partition(|ingredient| is_covered(&ingredient.name, user_ingredients));

    ScoredRecipe {
        recipe: recipe.clone(),
        match_score: score_recipe(recipe, user_ingredients),
        matched_ingredients: matched.into_iter().map(|i| i.name.clone()).collect(),
        missing_ingredients: missing.into_iter().map(|i| i.name.clone()).collect(),
    }
}

/// Scores, filters and ranks the catalog against the user's ingredients.
///
/// With no ingredients every recipe is kept with a score of 1 (browse mode);
/// otherwise recipes scoring 0 are dropped. Results are ordered by descending
/// score, ties keeping catalog order.
pub fn find_recipes<S: AsRef<str>>(
    recipes: &[Recipe],
    user_ingredients: &[S],
    filters: &SearchFilters,
) -> Vec<ScoredRecipe> {
    let browsing = user_ingredients.is_empty();

    let mut results: Vec<ScoredRecipe> = recipes
        .iter()
        .map(|recipe| score_one(recipe, user_ingredients))
        .filter_map(|mut scored| {
            if browsing {
                scored.match_score = 1.0;
                Some(scored)
            } else if scored.match_score > 0.0 {
                Some(scored)
            } else {
                None
            }
        })
        .filter(|scored| filters.accepts(&scored.recipe))
        .collect();

    results.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    results
}
