use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::debug;
use url::Url;

use super::{Document, DocumentLoader};
use crate::{AiError, Result};

/// Fetches a page over HTTP and keeps its readable text.
///
/// HTML bodies are converted to plain text; other text bodies are kept as-is.
pub struct WebPageLoader {
    client: Client,
    url: Url,
}

impl WebPageLoader {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            url: Url::parse(url)?,
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn load_error(&self, message: impl Into<String>) -> AiError {
        AiError::DocumentLoadError {
            source_ref: self.url.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl DocumentLoader for WebPageLoader {
    async fn load(&self) -> Result<Vec<Document>> {
        debug!(url = %self.url, "fetching page");
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| self.load_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.load_error(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_lowercase().contains("text/html"))
            .unwrap_or(true);

        let body = response
            .text()
            .await
            .map_err(|e| self.load_error(e.to_string()))?;

        let text = if is_html {
            nanohtml2text::html2text(&body)
        } else {
            body
        };

        Ok(vec![Document::new(text.trim())
            .with_metadata("source", self.url.to_string())
            .with_metadata("fetched_at", Utc::now().to_rfc3339())])
    }
}
