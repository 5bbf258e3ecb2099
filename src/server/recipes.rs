use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::AppState;
use crate::error::AppError;
use crate::recipes::{all_ingredients, cuisines, find_recipe, DietaryTag, Difficulty, Recipe, DIETARY_OPTIONS};
use crate::scaling::adjust_servings;
use crate::search::{find_recipes, get_substitutions, ScoredRecipe, SearchFilters};

pub(super) const RECIPE_NOT_FOUND: &str = "Recipe not found";

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn blank_to_none(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

/// Recipe id from the path. Anything that is not a known id reads as not found.
pub(super) fn recipe_by_id(
    state: &AppState,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Recipe, AppError> {
    let Ok(Path(id)) = id else {
        return Err(AppError::not_found(RECIPE_NOT_FOUND));
    };
    find_recipe(&state.recipes, id)
        .cloned()
        .ok_or_else(|| AppError::not_found(RECIPE_NOT_FOUND))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub ingredients: Option<String>,
    pub dietary: Option<String>,
    pub difficulty: Option<String>,
    pub max_cooking_time: Option<String>,
    pub cuisine: Option<String>,
}

impl SearchParams {
    fn filters(&self) -> Result<SearchFilters, AppError> {
        let dietary = split_list(self.dietary.as_deref())
            .iter()
            .map(|tag| tag.parse::<DietaryTag>().map_err(AppError::BadRequest))
            .collect::<Result<Vec<_>, _>>()?;

        let difficulty = blank_to_none(self.difficulty.as_deref())
            .map(|d| d.parse::<Difficulty>().map_err(AppError::BadRequest))
            .transpose()?;

        let max_cooking_time = blank_to_none(self.max_cooking_time.as_deref())
            .map(|t| {
                t.parse::<u32>().map_err(|_| {
                    AppError::bad_request(format!("Invalid maxCookingTime '{}'", t))
                })
            })
            .transpose()?;

        Ok(SearchFilters {
            dietary,
            difficulty,
            max_cooking_time,
            cuisine: blank_to_none(self.cuisine.as_deref()).map(str::to_string),
        })
    }
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ScoredRecipe>>, AppError> {
    let ingredients = split_list(params.ingredients.as_deref());
    let filters = params.filters()?;

    let results = find_recipes(&state.recipes, &ingredients, &filters);
    tracing::debug!(
        ingredients = ingredients.len(),
        results = results.len(),
        "Recipe search"
    );
    Ok(Json(results))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub cuisines: Vec<String>,
    pub dietary_options: Vec<DietaryTag>,
    pub difficulty_levels: Vec<Difficulty>,
    pub all_ingredients: Vec<String>,
}

pub async fn meta(State(state): State<AppState>) -> Json<MetaResponse> {
    Json(MetaResponse {
        cuisines: cuisines(&state.recipes),
        dietary_options: DIETARY_OPTIONS.to_vec(),
        difficulty_levels: Difficulty::ALL.to_vec(),
        all_ingredients: all_ingredients(&state.recipes),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    pub servings: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub recipe: Recipe,
    /// Only ingredients with at least one known substitute.
    pub substitutions: BTreeMap<String, Vec<String>>,
    pub favorite: bool,
    pub user_rating: Option<u8>,
}

pub async fn detail(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
    Query(params): Query<DetailParams>,
) -> Result<Json<RecipeDetail>, AppError> {
    let recipe = recipe_by_id(&state, id)?;

    let recipe = match blank_to_none(params.servings.as_deref()) {
        Some(raw) => match raw.parse::<u32>() {
            Ok(servings) if servings >= 1 => adjust_servings(&recipe, servings),
            _ => {
                return Err(AppError::bad_request(
                    "Servings must be a whole number of at least 1",
                ))
            }
        },
        None => recipe,
    };

    let substitutions = recipe
        .ingredients
        .iter()
        .filter_map(|ingredient| {
            let subs = get_substitutions(&ingredient.name);
            (!subs.is_empty()).then(|| (ingredient.name.clone(), subs))
        })
        .collect();

    Ok(Json(RecipeDetail {
        favorite: state.preferences.is_favorite(recipe.id),
        user_rating: state.preferences.rating(recipe.id),
        substitutions,
        recipe,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct SubstitutionParams {
    pub ingredient: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubstitutionResponse {
    pub ingredient: String,
    pub substitutes: Vec<String>,
}

pub async fn substitutions(Query(params): Query<SubstitutionParams>) -> Result<Json<SubstitutionResponse>, AppError> {
    let ingredient = blank_to_none(params.ingredient.as_deref())
        .ok_or_else(|| AppError::bad_request("No ingredient provided"))?;

    Ok(Json(SubstitutionResponse {
        ingredient: ingredient.to_string(),
        substitutes: get_substitutions(ingredient),
    }))
}
