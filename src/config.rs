//! Environment-driven settings shared by the sample programs.
//!
//! [`Settings::load`] reads a `.env` file first (when one exists) and then the
//! process environment. [`Settings::from_env`] skips the `.env` step.

use crate::{providers::openai::DEFAULT_BASE_URL, AiError, Result};

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const SERPAPI_API_KEY: &str = "SERPAPI_API_KEY";
pub const HUB_URL_BASE: &str = "LANGCHAIN_HUB_URL_BASE";
pub const LOG_LEVEL: &str = "CHAIN_SAMPLES_LOG";

pub const DEFAULT_HUB_URL_BASE: &str =
    "https://raw.githubusercontent.com/hwchase17/langchain-hub/master/";

#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub hub_url_base: String,
    pub log_level: String,
}

impl Settings {
    /// Load `.env` (if present) and then read the environment.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// Read settings from the process environment.
    ///
    /// Fails before anything touches the network when the OpenAI key is
    /// missing or blank.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openai_api_key: openai_api_key()?,
            openai_base_url: optional(OPENAI_BASE_URL)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_model: optional(OPENAI_MODEL),
            serpapi_api_key: optional(SERPAPI_API_KEY),
            hub_url_base: optional(HUB_URL_BASE)
                .unwrap_or_else(|| DEFAULT_HUB_URL_BASE.to_string()),
            log_level: optional(LOG_LEVEL).unwrap_or_else(|| "warn".to_string()),
        })
    }

    pub fn require_serpapi_key(&self) -> Result<&str> {
        self.serpapi_api_key
            .as_deref()
            .ok_or_else(|| AiError::missing_config(SERPAPI_API_KEY, "SerpApi key for web search"))
    }
}

/// The OpenAI credential, or a descriptive error when it is absent.
pub fn openai_api_key() -> Result<String> {
    optional(OPENAI_API_KEY)
        .ok_or_else(|| AiError::missing_config(OPENAI_API_KEY, "OpenAI API key for model calls"))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
