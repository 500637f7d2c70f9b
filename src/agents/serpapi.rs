use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::Tool;
use crate::{config::Settings, AiError, Result};

pub const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com";

const NO_RESULT: &str = "No good search result found";

/// Google search through SerpApi
pub struct SerpApiTool {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SerpApiTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_SERPAPI_URL.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(settings.require_serpapi_key()?))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn error(message: impl Into<String>) -> AiError {
        AiError::ToolExecutionError {
            tool_name: "search".to_string(),
            message: message.into(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<String> {
        debug!(query, "searching");
        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("q", query),
                ("engine", "google"),
            ])
            .send()
            .await
            .map_err(|e| Self::error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error(format!("SerpApi returned HTTP {}", status.as_u16())));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Self::error(format!("invalid SerpApi response: {}", e)))?;
        if let Some(message) = body["error"].as_str() {
            return Err(Self::error(message.to_string()));
        }
        Ok(extract_answer(&body))
    }
}

/// Answer box first, then the top organic snippet
fn extract_answer(body: &Value) -> String {
    let answer_box = &body["answer_box"];
    [
        &answer_box["answer"],
        &answer_box["snippet"],
        &body["organic_results"][0]["snippet"],
    ]
    .into_iter()
    .find_map(|v| v.as_str())
    .unwrap_or(NO_RESULT)
    .to_string()
}

#[async_trait]
impl Tool for SerpApiTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "A search engine. Useful for when you need to answer questions about current events."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "The search query" }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: &str) -> Result<String> {
        // models sometimes send the bare query instead of an arguments object
        let query = match serde_json::from_str::<Value>(arguments) {
            Ok(Value::Object(args)) => args
                .get("query")
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or_else(|| Self::error("missing 'query'"))?,
            _ => arguments.to_string(),
        };
        self.search(&query).await
    }
}
