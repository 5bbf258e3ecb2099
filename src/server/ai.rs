use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use super::AppState;
use crate::api_connection::endpoints::InlineImage;
use crate::error::AppError;
use crate::prompts::{image_recipe_prompt, recipe_by_name_prompt};
use crate::recipe_parser::{request_recipe, AiRecipe, ParseOptions};

const NO_IMAGE_MESSAGE: &str = "No image data provided";
const NO_DISH_MESSAGE: &str = "No dish name provided";
const DEFAULT_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRecipeRequest {
    #[serde(default)]
    pub dish_name: Option<String>,
}

/// Accepts raw base64 or a `data:<mime>;base64,` URL. An explicit `mimeType` wins.
fn inline_image(image: &str, mime_type: Option<&str>) -> Result<InlineImage, AppError> {
    let (url_mime, data) = match image.strip_prefix("data:").and_then(|rest| rest.split_once(";base64,")) {
        Some((mime, data)) => (Some(mime), data),
        None => (None, image),
    };

    STANDARD
        .decode(data)
        .map_err(|_| AppError::bad_request("Image data is not valid base64"))?;

    let mime_type = mime_type
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .or(url_mime.filter(|m| !m.is_empty()))
        .unwrap_or(DEFAULT_MIME_TYPE);

    Ok(InlineImage {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

pub async fn analyze_image(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeImageRequest>, JsonRejection>,
) -> Result<Json<AiRecipe>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected analyze-image body");
        AppError::bad_request(NO_IMAGE_MESSAGE)
    })?;

    let image = request
        .image
        .as_deref()
        .map(str::trim)
        .filter(|image| !image.is_empty())
        .ok_or_else(|| AppError::bad_request(NO_IMAGE_MESSAGE))?;
    let image = inline_image(image, request.mime_type.as_deref())?;

    tracing::info!(mime_type = %image.mime_type, base64_len = image.data.len(), "Analyzing food image");
    let recipe = request_recipe(&state.providers, &image_recipe_prompt(image), &ParseOptions::default()).await?;
    Ok(Json(recipe))
}

pub async fn generate_recipe(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRecipeRequest>, JsonRejection>,
) -> Result<Json<AiRecipe>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected generate-recipe body");
        AppError::bad_request(NO_DISH_MESSAGE)
    })?;

    let dish_name = request
        .dish_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::bad_request(NO_DISH_MESSAGE))?;

    tracing::info!(dish = %dish_name, "Generating recipe by name");
    let recipe = request_recipe(&state.providers, &recipe_by_name_prompt(dish_name), &ParseOptions::default()).await?;
    Ok(Json(recipe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_image_defaults_mime_type() {
        let image = inline_image("aGVsbG8=", None).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, "aGVsbG8=");
    }

    #[test]
    fn test_inline_image_reads_data_url() {
        let image = inline_image("data:image/png;base64,aGVsbG8=", None).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "aGVsbG8=");

        let explicit = inline_image("data:image/png;base64,aGVsbG8=", Some("image/webp")).unwrap();
        assert_eq!(explicit.mime_type, "image/webp");
    }

    #[test]
    fn test_inline_image_rejects_garbage() {
        assert!(matches!(inline_image("not base64!!", None), Err(AppError::BadRequest(_))));
    }
}
