use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::api_connection::connection::{DEFAULT_APP_NAME, DEFAULT_SITE_URL};
use crate::api_connection::endpoints::{DEFAULT_GEMINI_MODEL, DEFAULT_OPENROUTER_MODEL};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("Unknown log format '{}' (expected 'pretty' or 'json')", other),
        }
    }
}

/// Model provider credentials and request settings.
#[derive(Clone)]
pub struct ProviderSettings {
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub site_url: String,
    pub app_name: String,
    pub request_timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            openrouter_api_key: None,
            openrouter_model: DEFAULT_OPENROUTER_MODEL.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("openrouter_api_key", &masked_key(self.openrouter_api_key.as_deref(), 10))
            .field("openrouter_model", &self.openrouter_model)
            .field("gemini_api_key", &masked_key(self.gemini_api_key.as_deref(), 8))
            .field("gemini_model", &self.gemini_model)
            .field("site_url", &self.site_url)
            .field("app_name", &self.app_name)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// First `visible` characters followed by `...`, or `NOT SET`.
pub fn masked_key(key: Option<&str>, visible: usize) -> String {
    match key {
        Some(key) => format!("{}...", key.chars().take(visible).collect::<String>()),
        None => "NOT SET".to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: String,
    pub log_format: LogFormat,
    pub recipes_path: Option<PathBuf>,
    pub providers: ProviderSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            log_format: LogFormat::Pretty,
            recipes_path: None,
            providers: ProviderSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and reads configuration from the environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let request_timeout_secs = match var("AI_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("Invalid AI_REQUEST_TIMEOUT_SECS value '{}'", raw))?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let environment = var("APP_ENV").unwrap_or_else(|| "development".to_string());

        let log_format = match var("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().context("Invalid LOG_FORMAT")?,
            None if environment == "development" => LogFormat::Pretty,
            None => LogFormat::Json,
        };

        let providers = ProviderSettings {
            openrouter_api_key: var("OPENROUTER_API_KEY"),
            openrouter_model: var("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            site_url: var("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            app_name: var("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            request_timeout: Duration::from_secs(request_timeout_secs),
        };

        Ok(Self {
            port,
            environment,
            log_format,
            recipes_path: var("RECIPES_PATH").map(PathBuf::from),
            providers,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
