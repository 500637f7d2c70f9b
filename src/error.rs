use std::time::Duration;
use thiserror::Error;

/// Error types for every operation the samples perform
#[derive(Error, Debug, Clone)]
pub enum AiError {
    // Network and Connection Errors
    #[error("Network request failed: {message}")]
    NetworkError {
        message: String,
        retryable: bool,
        status_code: Option<u16>,
    },

    #[error("Request timed out: {message}")]
    TimeoutError { message: String, retryable: bool },

    #[error("Connection refused to {endpoint}")]
    ConnectionRefused { endpoint: String },

    // Authentication Errors
    #[error("Invalid API key for provider {provider}")]
    InvalidApiKey { provider: String },

    // Rate Limiting Errors
    #[error("Rate limit exceeded. Retry after {retry_after:?}")]
    RateLimitExceeded { retry_after: Option<Duration> },

    // Request/Response Errors
    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
        field: Option<String>,
    },

    #[error("Malformed response: {message}")]
    MalformedResponse {
        message: String,
        raw_response: Option<String>,
    },

    // Provider-Specific Errors
    #[error("Provider error from {provider}: {message}")]
    ProviderError {
        provider: String,
        message: String,
        status_code: Option<u16>,
        retryable: bool,
    },

    #[error("Service unavailable for provider {provider}")]
    ServiceUnavailable {
        provider: String,
        retry_after: Option<Duration>,
    },

    // Serialization/Deserialization Errors
    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    #[error("JSON parsing error: {message}")]
    JsonError {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    // Stream Errors
    #[error("Stream error: {message}")]
    StreamError { message: String, retryable: bool },

    // Tool and Agent Errors
    #[error("Tool execution failed: {tool_name}: {message}")]
    ToolExecutionError { tool_name: String, message: String },

    #[error("Tool not found: {tool_name}")]
    ToolNotFound {
        tool_name: String,
        available_tools: Vec<String>,
    },

    #[error("Agent stopped after {iterations} iterations without a final answer")]
    MaxIterationsReached { iterations: usize },

    // Memory Errors
    #[error("Memory operation failed: {operation}: {message}")]
    MemoryError { operation: String, message: String },

    // Prompt Errors
    #[error("Missing value for prompt variable '{variable}'")]
    MissingPromptVariable { variable: String },

    #[error("Invalid prompt template: {message}")]
    TemplateError { message: String },

    // Output Parsing Errors
    #[error("Failed to parse model output: {message}")]
    OutputParserError { message: String, llm_output: String },

    // Document Errors
    #[error("Failed to load document from {source_ref}: {message}")]
    DocumentLoadError { source_ref: String, message: String },

    // Configuration Errors
    #[error("Invalid configuration: {field}: {message}")]
    ConfigurationError { field: String, message: String },

    #[error("Missing required configuration: {field} ({description})")]
    MissingConfiguration { field: String, description: String },

    // Internal Errors
    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        component: Option<String>,
    },

    #[error("Not implemented: {feature}")]
    NotImplemented { feature: String },
}

impl AiError {
    /// Whether a caller could reasonably try the same call again.
    ///
    /// Nothing in this crate retries; the classification only feeds logs.
    pub fn is_retryable(&self) -> bool {
        match self {
            AiError::NetworkError { retryable, .. } => *retryable,
            AiError::TimeoutError { retryable, .. } => *retryable,
            AiError::ProviderError { retryable, .. } => *retryable,
            AiError::StreamError { retryable, .. } => *retryable,
            AiError::RateLimitExceeded { .. }
            | AiError::ServiceUnavailable { .. }
            | AiError::ConnectionRefused { .. } => true,
            _ => false,
        }
    }

    /// Get the provider associated with this error, if any
    pub fn provider(&self) -> Option<&str> {
        match self {
            AiError::InvalidApiKey { provider }
            | AiError::ProviderError { provider, .. }
            | AiError::ServiceUnavailable { provider, .. } => Some(provider),
            _ => None,
        }
    }

    pub fn not_implemented(feature: impl Into<String>) -> Self {
        AiError::NotImplemented {
            feature: feature.into(),
        }
    }

    pub fn missing_config(field: impl Into<String>, description: impl Into<String>) -> Self {
        AiError::MissingConfiguration {
            field: field.into(),
            description: description.into(),
        }
    }
}

// Conversion from common error types
impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        let retryable = err.is_timeout()
            || err.is_connect()
            || err.status().is_some_and(|s| s.is_server_error());

        let status_code = err.status().map(|s| s.as_u16());

        if err.is_timeout() {
            AiError::TimeoutError {
                message: err.to_string(),
                retryable: true,
            }
        } else if err.is_connect() {
            AiError::ConnectionRefused {
                endpoint: err.url().map_or("unknown".to_string(), |u| u.to_string()),
            }
        } else if err.is_decode() {
            AiError::MalformedResponse {
                message: err.to_string(),
                raw_response: None,
            }
        } else {
            AiError::NetworkError {
                message: err.to_string(),
                retryable,
                status_code,
            }
        }
    }
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::JsonError {
            message: err.to_string(),
            line: Some(err.line()),
            column: Some(err.column()),
        }
    }
}

impl From<serde_yaml::Error> for AiError {
    fn from(err: serde_yaml::Error) -> Self {
        let location = err.location();
        AiError::SerializationError {
            message: match location {
                Some(loc) => format!("{} (line {}, column {})", err, loc.line(), loc.column()),
                None => err.to_string(),
            },
        }
    }
}

impl From<url::ParseError> for AiError {
    fn from(err: url::ParseError) -> Self {
        AiError::InvalidRequest {
            message: format!("invalid URL: {}", err),
            field: Some("url".to_string()),
        }
    }
}

impl From<std::io::Error> for AiError {
    fn from(err: std::io::Error) -> Self {
        AiError::InternalError {
            message: err.to_string(),
            component: Some("io".to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AiError>;
