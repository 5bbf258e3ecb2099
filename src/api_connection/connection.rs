use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::endpoints::{
    ChatCompletionRequest, ChatCompletionResponse, GenerateContentRequest,
    GenerateContentResponse, ModelPrompt, DEFAULT_GEMINI_MODEL, DEFAULT_OPENROUTER_MODEL,
    GEMINI_BASE_URL, OPENROUTER_URL,
};

pub const DEFAULT_SITE_URL: &str = "http://localhost:5173";
pub const DEFAULT_APP_NAME: &str = "Smart Recipe Generator";

const GEMINI_MAX_ATTEMPTS: u32 = 3;
const GEMINI_RETRY_BASE_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: StatusCode,
        error_body: String,
    },
    #[error("Response blocked by safety filter")]
    Blocked,
    #[error("Provider returned no text")]
    EmptyResponse,
    #[error("No model providers configured")]
    NoProviders,
    #[error("All model providers failed: {0}")]
    AllProvidersFailed(String),
}

/// A text-generation backend.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Returns the raw reply text, possibly empty.
    async fn complete(&self, prompt: &ModelPrompt) -> Result<String, ApiConnectionError>;

    fn name(&self) -> &str;
}

fn read_api_key(api_key_env_var_name: &str) -> Result<String, ApiConnectionError> {
    dotenv::dotenv().ok();
    env::var(api_key_env_var_name)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ApiConnectionError::MissingApiKey(api_key_env_var_name.to_string()))
}

async fn error_from_response(response: reqwest::Response) -> ApiConnectionError {
    let status = response.status();
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    ApiConnectionError::ApiError { status, error_body }
}

#[derive(Clone)]
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    model: String,
    url: String,
    site_url: String,
    app_name: String,
}

impl OpenRouterProvider {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_OPENROUTER_MODEL.to_string(),
            url: OPENROUTER_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }

    /// Reads the key from `api_key_env_var_name` (after loading `.env`).
    pub fn from_env(api_key_env_var_name: &str) -> Result<Self, ApiConnectionError> {
        let api_key = read_api_key(api_key_env_var_name)?;
        Ok(Self::new(Client::new(), api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Values sent as `HTTP-Referer` and `X-Title`.
    pub fn with_attribution(mut self, site_url: impl Into<String>, app_name: impl Into<String>) -> Self {
        self.site_url = site_url.into();
        self.app_name = app_name.into();
        self
    }
}

impl fmt::Debug for OpenRouterProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterProvider")
            .field("model", &self.model)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn complete(&self, prompt: &ModelPrompt) -> Result<String, ApiConnectionError> {
        let request = ChatCompletionRequest::from_prompt(&self.model, prompt);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.app_name)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let chat_response = response.json::<ChatCompletionResponse>().await?;
        Ok(chat_response.first_text())
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_attempts: u32,
    retry_base_delay: Duration,
}

impl GeminiProvider {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            max_attempts: GEMINI_MAX_ATTEMPTS,
            retry_base_delay: GEMINI_RETRY_BASE_DELAY,
        }
    }

    pub fn from_env(api_key_env_var_name: &str) -> Result<Self, ApiConnectionError> {
        let api_key = read_api_key(api_key_env_var_name)?;
        Ok(Self::new(Client::new(), api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Rate-limited calls wait `attempt * base_delay` before the next try.
    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_base_delay = base_delay;
        self
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model", &self.model)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, prompt: &ModelPrompt) -> Result<String, ApiConnectionError> {
        let request = GenerateContentRequest::from_prompt(prompt);
        let url = self.generate_url();

        let mut attempt = 1;
        loop {
            let response = self
                .client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_attempts {
                let delay = self.retry_base_delay * attempt;
                tracing::warn!(
                    model = %self.model,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Gemini rate limited, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                return Err(error_from_response(response).await);
            }

            let body = response.json::<GenerateContentResponse>().await?;
            let Some(candidate) = body.candidates.first() else {
                return Err(ApiConnectionError::EmptyResponse);
            };
            if candidate.is_blocked() {
                return Err(ApiConnectionError::Blocked);
            }
            return Ok(candidate.first_text());
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_missing_key() {
        let result = OpenRouterProvider::from_env("RECIPE_FINDER_TEST_UNSET_KEY");
        match result {
            Err(ApiConnectionError::MissingApiKey(name)) => {
                assert_eq!(name, "RECIPE_FINDER_TEST_UNSET_KEY")
            }
            other => panic!("expected MissingApiKey, got {:?}", other),
        }
    }

    #[test]
    fn test_gemini_url_includes_model() {
        let provider = GeminiProvider::new(Client::new(), "k").with_base_url("http://127.0.0.1:9/models/");
        assert_eq!(
            provider.generate_url(),
            "http://127.0.0.1:9/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_debug_output_hides_api_key() {
        let provider = OpenRouterProvider::new(Client::new(), "sk-or-secret-value");
        let rendered = format!("{:?}", provider);
        assert!(rendered.contains("openrouter/free"));
        assert!(!rendered.contains("secret"));

        let gemini = GeminiProvider::new(Client::new(), "AIza-secret-value");
        assert!(!format!("{:?}", gemini).contains("secret"));
    }

    #[test]
    fn test_error_messages() {
        let err = ApiConnectionError::ApiError {
            status: StatusCode::UNAUTHORIZED,
            error_body: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401 Unauthorized: bad key");
        assert_eq!(
            ApiConnectionError::MissingApiKey("GEMINI_API_KEY".into()).to_string(),
            "API key not found in environment: GEMINI_API_KEY"
        );
    }
}
