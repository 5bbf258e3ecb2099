use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::config::masked_key;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Key status with only a short prefix of each key exposed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResponse {
    pub has_gemini_key: bool,
    pub gemini_key_prefix: String,
    pub has_open_router_key: bool,
    pub open_router_key_prefix: String,
    pub environment: String,
    pub timestamp: String,
}

pub async fn debug(State(state): State<AppState>) -> Json<DebugResponse> {
    let providers = &state.config.providers;
    Json(DebugResponse {
        has_gemini_key: providers.gemini_api_key.is_some(),
        gemini_key_prefix: masked_key(providers.gemini_api_key.as_deref(), 8),
        has_open_router_key: providers.openrouter_api_key.is_some(),
        open_router_key_prefix: masked_key(providers.openrouter_api_key.as_deref(), 10),
        environment: state.config.environment.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
