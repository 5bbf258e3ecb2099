mod ai;
mod preferences;
mod recipes;
mod status;

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, MatchedPath, Request},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::Span;

use crate::api_connection::chain::ProviderChain;
use crate::config::AppConfig;
use crate::recipes::{builtin_recipes, load_recipes_from_path, Recipe};
use crate::store::{InMemoryStore, Preferences};

/// Request bodies carry base64 images, so the cap is well above axum's default.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<Vec<Recipe>>,
    pub providers: Arc<ProviderChain>,
    pub preferences: Arc<Preferences<InMemoryStore>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, recipes: Vec<Recipe>, providers: ProviderChain) -> Self {
        Self {
            recipes: Arc::new(recipes),
            providers: Arc::new(providers),
            preferences: Arc::new(Preferences::new(InMemoryStore::new())),
            config: Arc::new(config),
        }
    }

    /// Catalog from `RECIPES_PATH` or the built-in data, providers from the configured keys.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let recipes = match &config.recipes_path {
            Some(path) => load_recipes_from_path(path)?,
            None => builtin_recipes()?,
        };
        let providers = ProviderChain::from_settings(&config.providers)?;
        Ok(Self::new(config, recipes, providers))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(status::health))
        .route("/api/debug", get(status::debug))
        .route("/api/analyze-image", post(ai::analyze_image))
        .route("/api/generate-recipe", post(ai::generate_recipe))
        .route("/api/recipes", get(recipes::search))
        .route("/api/recipes/meta", get(recipes::meta))
        .route("/api/recipes/:id", get(recipes::detail))
        .route("/api/substitutions", get(recipes::substitutions))
        .route("/api/favorites", get(preferences::list_favorites))
        .route("/api/favorites/:id", post(preferences::toggle_favorite))
        .route("/api/ratings/:id", put(preferences::rate))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                })
                .on_request(|_request: &Request, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                ),
        )
}

pub async fn serve(config: AppConfig) -> Result<()> {
    let port = config.port;
    let state = AppState::from_config(config)?;

    tracing::info!(
        recipes = state.recipes.len(),
        providers = ?state.providers.provider_names(),
        environment = %state.config.environment,
        "Starting recipe server"
    );

    let address = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Listening");

    axum::serve(listener, router(state))
        .await
        .context("Server terminated unexpectedly")
}
