//! Loading prompt files from the LangChain hub, a URL or the local disk.
//!
//! `lc://prompts/qa/stuff/basic/prompt.yaml` resolves against the hub base
//! URL; `http(s)://` URIs are fetched as-is; anything else is a file path.

use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::{
    config::{Settings, DEFAULT_HUB_URL_BASE},
    prompts::PromptTemplate,
    AiError, Result,
};

pub const HUB_SCHEME: &str = "lc://";

#[derive(Debug, Clone, PartialEq)]
pub enum PromptSource {
    Remote(Url),
    Local(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FileFormat {
    Json,
    Yaml,
}

#[derive(Debug, Deserialize)]
struct PromptFile {
    #[serde(rename = "_type", default)]
    kind: Option<String>,
    template: Option<String>,
    template_path: Option<String>,
    input_variables: Option<Vec<String>>,
    template_format: Option<String>,
}

pub struct HubClient {
    client: Client,
    base_url: String,
}

impl Default for HubClient {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_URL_BASE)
    }
}

impl HubClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.hub_url_base.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Work out where a prompt URI points
    pub fn resolve(&self, uri: &str) -> Result<PromptSource> {
        if let Some(path) = uri.strip_prefix(HUB_SCHEME) {
            let url = Url::parse(&self.base_url)?.join(path.trim_start_matches('/'))?;
            return Ok(PromptSource::Remote(url));
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return Ok(PromptSource::Remote(Url::parse(uri)?));
        }
        Ok(PromptSource::Local(PathBuf::from(uri)))
    }

    pub async fn load_prompt(&self, uri: &str) -> Result<PromptTemplate> {
        let source = self.resolve(uri)?;
        let (path, body) = match &source {
            PromptSource::Remote(url) => (url.path().to_string(), self.fetch(url).await?),
            PromptSource::Local(path) => (
                path.display().to_string(),
                tokio::fs::read_to_string(path).await.map_err(|e| {
                    AiError::DocumentLoadError {
                        source_ref: path.display().to_string(),
                        message: e.to_string(),
                    }
                })?,
            ),
        };

        let file: PromptFile = match file_format(&path)? {
            FileFormat::Json => serde_json::from_str(&body)?,
            FileFormat::Yaml => serde_yaml::from_str(&body)?,
        };
        prompt_from_file(file, uri)
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching prompt");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AiError::DocumentLoadError {
                source_ref: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }
        Ok(response.text().await?)
    }
}

fn file_format(path: &str) -> Result<FileFormat> {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(FileFormat::Json),
        Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
        _ => Err(AiError::InvalidRequest {
            message: format!("unsupported prompt file '{}': expected .json, .yaml or .yml", path),
            field: Some("uri".to_string()),
        }),
    }
}

fn prompt_from_file(file: PromptFile, uri: &str) -> Result<PromptTemplate> {
    let kind = file.kind.as_deref().unwrap_or("prompt");
    if kind != "prompt" {
        return Err(AiError::TemplateError {
            message: format!("{}: unsupported prompt type '{}'", uri, kind),
        });
    }
    if let Some(format) = file.template_format.as_deref() {
        if format != "f-string" {
            return Err(AiError::TemplateError {
                message: format!("{}: unsupported template format '{}'", uri, format),
            });
        }
    }
    let template = match (file.template, file.template_path) {
        (Some(template), _) => template,
        (None, Some(_)) => {
            return Err(AiError::TemplateError {
                message: format!("{}: template_path is not supported, inline the template", uri),
            })
        }
        (None, None) => {
            return Err(AiError::TemplateError {
                message: format!("{}: no template", uri),
            })
        }
    };

    match file.input_variables {
        Some(variables) => {
            let variables: Vec<&str> = variables.iter().map(String::as_str).collect();
            PromptTemplate::with_input_variables(template, &variables)
        }
        None => PromptTemplate::new(template),
    }
}
