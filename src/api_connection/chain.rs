use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;

use super::connection::{ApiConnectionError, GeminiProvider, LlmProvider, OpenRouterProvider};
use super::endpoints::ModelPrompt;
use crate::config::ProviderSettings;

/// Text produced by the first provider that answered.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub provider: String,
    pub text: String,
}

/// Providers tried in order until one yields non-blank text.
#[derive(Debug, Clone, Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn LlmProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: impl LlmProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn push(&mut self, provider: Arc<dyn LlmProvider>) {
        self.providers.push(provider);
    }

    /// OpenRouter first, then Gemini, each only when its key is configured.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("Failed to build HTTP client for model providers")?;

        let mut chain = Self::new();
        if let Some(key) = &settings.openrouter_api_key {
            chain = chain.with_provider(
                OpenRouterProvider::new(client.clone(), key.clone())
                    .with_model(settings.openrouter_model.clone())
                    .with_attribution(settings.site_url.clone(), settings.app_name.clone()),
            );
        }
        if let Some(key) = &settings.gemini_api_key {
            chain = chain.with_provider(
                GeminiProvider::new(client, key.clone()).with_model(settings.gemini_model.clone()),
            );
        }

        if chain.is_empty() {
            tracing::warn!("No model provider keys configured; AI endpoints will fail");
        }
        Ok(chain)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub async fn complete(&self, prompt: &ModelPrompt) -> Result<Completion, ApiConnectionError> {
        if self.providers.is_empty() {
            return Err(ApiConnectionError::NoProviders);
        }

        let mut failures = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            match provider.complete(prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    return Ok(Completion {
                        provider: provider.name().to_string(),
                        text,
                    });
                }
                Ok(_) => {
                    tracing::warn!(provider = provider.name(), "Provider returned empty text");
                    failures.push(format!("{}: {}", provider.name(), ApiConnectionError::EmptyResponse));
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider call failed");
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        Err(ApiConnectionError::AllProvidersFailed(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Scripted {
        name: &'static str,
        reply: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LlmProvider for Scripted {
        async fn complete(&self, _prompt: &ModelPrompt) -> Result<String, ApiConnectionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .map(str::to_string)
                .ok_or(ApiConnectionError::Blocked)
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn scripted(name: &'static str, reply: Option<&'static str>) -> (Scripted, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Scripted { name, reply, calls: calls.clone() }, calls)
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let err = ProviderChain::new()
            .complete(&ModelPrompt::text("hi", 0.3))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiConnectionError::NoProviders));
    }

    #[tokio::test]
    async fn test_first_success_stops_the_chain() {
        let (first, first_calls) = scripted("first", Some("{}"));
        let (second, second_calls) = scripted("second", Some("never"));
        let chain = ProviderChain::new().with_provider(first).with_provider(second);

        let completion = chain.complete(&ModelPrompt::text("hi", 0.3)).await.unwrap();
        assert_eq!(completion, Completion { provider: "first".into(), text: "{}".into() });
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_and_blank_text_fall_through() {
        let (failing, _) = scripted("failing", None);
        let (blank, _) = scripted("blank", Some("  \n"));
        let (working, _) = scripted("working", Some("Pasta"));
        let chain = ProviderChain::new()
            .with_provider(failing)
            .with_provider(blank)
            .with_provider(working);

        let completion = chain.complete(&ModelPrompt::text("hi", 0.3)).await.unwrap();
        assert_eq!(completion.provider, "working");
        assert_eq!(completion.text, "Pasta");
    }

    #[tokio::test]
    async fn test_all_failed_lists_each_provider() {
        let (a, _) = scripted("a", None);
        let (b, _) = scripted("b", Some(""));
        let chain = ProviderChain::new().with_provider(a).with_provider(b);

        match chain.complete(&ModelPrompt::text("hi", 0.3)).await {
            Err(ApiConnectionError::AllProvidersFailed(detail)) => {
                assert!(detail.contains("a: Response blocked"));
                assert!(detail.contains("b: Provider returned no text"));
            }
            other => panic!("expected AllProvidersFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_from_settings_orders_openrouter_first() {
        let mut settings = ProviderSettings::default();
        assert!(ProviderChain::from_settings(&settings).unwrap().is_empty());

        settings.gemini_api_key = Some("g".into());
        settings.openrouter_api_key = Some("o".into());
        let chain = ProviderChain::from_settings(&settings).unwrap();
        assert_eq!(chain.provider_names(), vec!["openrouter", "gemini"]);
    }
}
