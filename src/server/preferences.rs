use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use super::recipes::recipe_by_id;
use super::AppState;
use crate::error::AppError;
use crate::recipes::{find_recipe, Recipe};

const INVALID_RATING_MESSAGE: &str = "Rating must be between 1 and 5 stars";

/// Favorited recipes in the order they were added.
pub async fn list_favorites(State(state): State<AppState>) -> Json<Vec<Recipe>> {
    let favorites = state
        .preferences
        .favorites()
        .into_iter()
        .filter_map(|id| find_recipe(&state.recipes, id).cloned())
        .collect();
    Json(favorites)
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub id: u32,
    pub favorite: bool,
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Json<FavoriteResponse>, AppError> {
    let recipe = recipe_by_id(&state, id)?;
    let favorite = state.preferences.toggle_favorite(recipe.id);
    tracing::debug!(id = recipe.id, favorite, "Favorite toggled");
    Ok(Json(FavoriteResponse {
        id: recipe.id,
        favorite,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub stars: i64,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub id: u32,
    pub rating: u8,
}

pub async fn rate(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
    payload: Result<Json<RateRequest>, JsonRejection>,
) -> Result<Json<RatingResponse>, AppError> {
    let recipe = recipe_by_id(&state, id)?;
    let Json(request) = payload.map_err(|_| AppError::bad_request(INVALID_RATING_MESSAGE))?;

    let stars = u8::try_from(request.stars).unwrap_or(0);
    if !state.preferences.rate(recipe.id, stars) {
        return Err(AppError::bad_request(INVALID_RATING_MESSAGE));
    }

    Ok(Json(RatingResponse {
        id: recipe.id,
        rating: stars,
    }))
}
