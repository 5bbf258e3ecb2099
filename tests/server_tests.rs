use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use recipe_finder::api_connection::{
    chain::ProviderChain,
    connection::{ApiConnectionError, LlmProvider},
    endpoints::ModelPrompt,
};
use recipe_finder::config::{AppConfig, ProviderSettings};
use recipe_finder::recipes::builtin_recipes;
use recipe_finder::server::{router, AppState, MAX_BODY_BYTES};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Returns a fixed reply and remembers the last prompt it saw.
#[derive(Debug, Default)]
struct StubProvider {
    reply: Option<String>,
    seen: Mutex<Option<ModelPrompt>>,
}

#[async_trait]
impl LlmProvider for StubProvider {
    async fn complete(&self, prompt: &ModelPrompt) -> Result<String, ApiConnectionError> {
        *self.seen.lock().unwrap() = Some(prompt.clone());
        self.reply.clone().ok_or(ApiConnectionError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn stub(reply: Option<&str>) -> Arc<StubProvider> {
    Arc::new(StubProvider {
        reply: reply.map(str::to_string),
        seen: Mutex::new(None),
    })
}

fn app_with(config: AppConfig, chain: ProviderChain) -> Router {
    router(AppState::new(config, builtin_recipes().unwrap(), chain))
}

fn app() -> Router {
    app_with(AppConfig::default(), ProviderChain::new())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(&app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_debug_masks_keys() {
    let config = AppConfig {
        providers: ProviderSettings {
            gemini_api_key: Some("AIzaSyD-1234567890".to_string()),
            ..ProviderSettings::default()
        },
        ..AppConfig::default()
    };
    let (status, body) = get(&app_with(config, ProviderChain::new()), "/api/debug").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasGeminiKey"], true);
    assert_eq!(body["geminiKeyPrefix"], "AIzaSyD-...");
    assert_eq!(body["hasOpenRouterKey"], false);
    assert_eq!(body["openRouterKeyPrefix"], "NOT SET");
    assert_eq!(body["environment"], "development");
}

#[tokio::test]
async fn test_generate_recipe_requires_dish_name() {
    let app = app();
    for payload in [json!({}), json!({"dishName": "   "})] {
        let (status, body) = send(&app, Method::POST, "/api/generate-recipe", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No dish name provided"}));
    }
}

#[tokio::test]
async fn test_generate_recipe_without_providers_is_bad_gateway() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/api/generate-recipe",
        Some(json!({"dishName": "Pad Thai"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Could not get AI response. Check API keys."}));
}

#[tokio::test]
async fn test_generate_recipe_falls_through_to_working_provider() {
    let failing = stub(None);
    let working = stub(Some(
        "```json\n{\"dishName\": \"Pad Thai\", \"ingredients\": [{\"name\": \"rice noodles\", \"quantity\": 200}], \"recipe\": {\"servings\": \"2\", \"steps\": [\"Soak noodles\"]}}\n```",
    ));
    let mut chain = ProviderChain::new();
    chain.push(failing.clone());
    chain.push(working.clone());
    let app = app_with(AppConfig::default(), chain);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/generate-recipe",
        Some(json!({"dishName": "  Pad Thai  "})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dishName"], "Pad Thai");
    assert_eq!(body["ingredients"], json!([{"name": "rice noodles", "quantity": "200"}]));
    assert_eq!(body["recipe"]["servings"], 2);
    assert_eq!(body["recipe"]["difficulty"], "Medium");
    assert!(body.get("rawResponse").is_none());

    let prompt = working.seen.lock().unwrap().clone().unwrap();
    assert!(prompt.text.contains("The user wants to cook \"Pad Thai\"."));
    assert!(prompt.image.is_none());
    assert!(failing.seen.lock().unwrap().is_some());
}

#[tokio::test]
async fn test_analyze_image_validation() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/api/analyze-image", Some(json!({"mimeType": "image/png"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image data provided");

    let (status, body) = send(&app, Method::POST, "/api/analyze-image", Some(json!({"image": "%%%"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Image data is not valid base64");
}

#[tokio::test]
async fn test_analyze_image_sends_inline_image() {
    let provider = stub(Some("Looks like a bowl of ramen with noodles, egg, scallions"));
    let mut chain = ProviderChain::new();
    chain.push(provider.clone());
    let app = app_with(AppConfig::default(), chain);

    let (status, body) = send(&app, Method::POST, "/api/analyze-image", Some(json!({"image": "aGVsbG8="}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dishName"], "Detected Dish");
    assert_eq!(body["recipe"]["prepTime"], "N/A");
    assert_eq!(
        body["rawResponse"],
        "Looks like a bowl of ramen with noodles, egg, scallions"
    );

    let prompt = provider.seen.lock().unwrap().clone().unwrap();
    let image = prompt.image.unwrap();
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image.data, "aGVsbG8=");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/analyze-image")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, MAX_BODY_BYTES + 1)
        .body(Body::from(vec![b' '; MAX_BODY_BYTES + 1]))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_search_by_ingredient() {
    let (status, body) = get(&app(), "/api/recipes?ingredients=chicken").await;
    assert_eq!(status, StatusCode::OK);

    let results = body.as_array().unwrap();
    let mut ids: Vec<u64> = results.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![2, 4, 6, 16, 20]);

    let scores: Vec<f64> = results.iter().map(|r| r["matchScore"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert!(results.iter().all(|r| r["matchedIngredients"].as_array().unwrap().iter().any(|i| i.as_str().unwrap().contains("chicken"))));
}

#[tokio::test]
async fn test_search_filters_and_errors() {
    let app = app();

    let (status, body) = get(&app, "/api/recipes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 25);

    let (_, body) = get(&app, "/api/recipes?ingredients=chicken&dietary=vegan").await;
    assert_eq!(body, json!([]));

    let (_, body) = get(&app, "/api/recipes?dietary=vegan,gluten-free&maxCookingTime=0").await;
    for recipe in body.as_array().unwrap() {
        let tags = recipe["dietary"].as_array().unwrap();
        assert!(tags.contains(&json!("vegan")) && tags.contains(&json!("gluten-free")));
        assert_eq!(recipe["matchScore"], 1.0);
    }

    let (status, body) = get(&app, "/api/recipes?dietary=keto").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("keto"));

    let (status, _) = get(&app, "/api/recipes?difficulty=impossible").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_meta() {
    let (status, body) = get(&app(), "/api/recipes/meta").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cuisines"].as_array().unwrap().len(), 12);
    assert_eq!(body["cuisines"][0], "American");
    assert_eq!(body["dietaryOptions"], json!(["vegetarian", "vegan", "gluten-free"]));
    assert_eq!(body["difficultyLevels"], json!(["Easy", "Medium", "Hard"]));
    assert!(body["allIngredients"].as_array().unwrap().contains(&json!("mozzarella cheese")));
}

#[tokio::test]
async fn test_recipe_detail_with_rescale() {
    let (status, body) = get(&app(), "/api/recipes/1?servings=8").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["recipe"]["servings"], 8);
    assert_eq!(body["recipe"]["ingredients"][1]["amount"], "1");
    assert_eq!(body["recipe"]["nutrition"]["calories"], 532);
    assert_eq!(
        body["substitutions"],
        json!({"mozzarella cheese": ["provolone", "gouda", "vegan mozzarella"]})
    );
    assert_eq!(body["favorite"], false);
    assert_eq!(body["userRating"], Value::Null);
}

#[tokio::test]
async fn test_recipe_detail_errors() {
    let app = app();

    let (status, body) = get(&app, "/api/recipes/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Recipe not found"}));

    let (status, _) = get(&app, "/api/recipes/abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for servings in ["0", "-2", "two"] {
        let (status, _) = get(&app, &format!("/api/recipes/1?servings={}", servings)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "servings={}", servings);
    }
}

#[tokio::test]
async fn test_substitutions_endpoint() {
    let app = app();
    let (status, body) = get(&app, "/api/substitutions?ingredient=unsalted%20butter").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"ingredient": "unsalted butter", "substitutes": ["margarine", "coconut oil", "olive oil"]})
    );

    let (_, body) = get(&app, "/api/substitutions?ingredient=saffron").await;
    assert_eq!(body["substitutes"], json!([]));

    let (status, _) = get(&app, "/api/substitutions").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_favorites_and_ratings() {
    let app = app();

    let (_, body) = send(&app, Method::POST, "/api/favorites/3", None).await;
    assert_eq!(body, json!({"id": 3, "favorite": true}));
    send(&app, Method::POST, "/api/favorites/1", None).await;

    let (_, body) = get(&app, "/api/favorites").await;
    let ids: Vec<u64> = body.as_array().unwrap().iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![3, 1]);

    let (_, body) = send(&app, Method::POST, "/api/favorites/3", None).await;
    assert_eq!(body["favorite"], false);

    let (status, _) = send(&app, Method::POST, "/api/favorites/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::PUT, "/api/ratings/1", Some(json!({"stars": 4}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "rating": 4}));
    send(&app, Method::PUT, "/api/ratings/1", Some(json!({"stars": 2}))).await;

    for stars in [0, 6, -1] {
        let (status, _) = send(&app, Method::PUT, "/api/ratings/1", Some(json!({"stars": stars}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, body) = get(&app, "/api/recipes/1").await;
    assert_eq!(body["favorite"], true);
    assert_eq!(body["userRating"], 2);
}
