use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::{
    config::Settings, AiError, Choice, CompletionProvider, CompletionRequest, CompletionResponse,
    CompletionStream, Delta, Message, Result, Role, StreamChoice, StreamChunk, Tool, ToolCall,
    ToolChoice, Usage,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const PROVIDER: &str = "OpenAI";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_base_url(
            settings.openai_api_key.clone(),
            settings.openai_base_url.clone(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(&self, request: CompletionRequest, stream: bool) -> OpenAIRequest {
        OpenAIRequest {
            model: request.model,
            messages: request.messages.into_iter().map(convert_message).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: Some(stream),
            top_p: request.top_p,
            frequency_penalty: request.frequency_penalty,
            presence_penalty: request.presence_penalty,
            stop: request.stop,
            tools: request.tools,
            tool_choice: request.tool_choice,
        }
    }

    async fn post(&self, body: &OpenAIRequest) -> Result<reqwest::Response> {
        debug!(
            model = %body.model,
            messages = body.messages.len(),
            stream = body.stream.unwrap_or(false),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response)
    }
}

fn convert_message(msg: Message) -> OpenAIMessage {
    OpenAIMessage {
        role: match msg.role {
            Role::System => "system".to_string(),
            Role::User => "user".to_string(),
            Role::Assistant => "assistant".to_string(),
            Role::Tool => "tool".to_string(),
        },
        content: msg.content,
        tool_calls: msg.tool_calls,
        tool_call_id: msg.tool_call_id,
    }
}

fn convert_response(resp: OpenAIResponse) -> CompletionResponse {
    CompletionResponse {
        id: resp.id,
        model: resp.model,
        choices: resp
            .choices
            .into_iter()
            .map(|c| Choice {
                index: c.index,
                message: Message {
                    role: Role::from_wire(&c.message.role),
                    content: c.message.content,
                    tool_calls: c.message.tool_calls,
                    tool_call_id: None,
                },
                finish_reason: c.finish_reason,
            })
            .collect(),
        usage: resp.usage,
    }
}

async fn error_from_response(response: reqwest::Response) -> AiError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<OpenAIErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    match status.as_u16() {
        401 => AiError::InvalidApiKey {
            provider: PROVIDER.to_string(),
        },
        429 => AiError::RateLimitExceeded { retry_after },
        503 => AiError::ServiceUnavailable {
            provider: PROVIDER.to_string(),
            retry_after,
        },
        code => AiError::ProviderError {
            provider: PROVIDER.to_string(),
            message: format!("OpenAI API error: {}", message),
            status_code: Some(code),
            retryable: status.is_server_error(),
        },
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    id: String,
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    index: u32,
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIStreamChunk {
    id: String,
    model: Option<String>,
    choices: Vec<OpenAIStreamChoice>,
}

#[derive(Deserialize)]
struct OpenAIStreamChoice {
    index: u32,
    delta: OpenAIDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIDelta {
    role: Option<String>,
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIErrorBody {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(request, false);
        let response = self.post(&body).await?;

        let openai_response: OpenAIResponse = response.json().await?;
        Ok(convert_response(openai_response))
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        let body = self.build_request(request, true);
        let response = self.post(&body).await?;

        // `None` marks the end of the body so the decoder can flush its last line.
        let stream = response
            .bytes_stream()
            .map(Some)
            .chain(stream::once(futures::future::ready(None)))
            .scan(SseDecoder::default(), |decoder, next| {
                let items = match next {
                    Some(Ok(bytes)) => decoder.push(&bytes),
                    Some(Err(e)) => vec![Err(AiError::StreamError {
                        message: e.to_string(),
                        retryable: true,
                    })],
                    None => decoder.finish(),
                };
                futures::future::ready(Some(stream::iter(items)))
            })
            .flatten();

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn default_model(&self) -> &'static str {
        "gpt-4o-mini"
    }
}

/// Reassembles server-sent event lines that may be split across network chunks.
///
/// Bytes are buffered until a full line arrives, so a UTF-8 character cut
/// between two chunks is decoded whole.
#[derive(Default)]
struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<StreamChunk>> {
        self.buffer.extend_from_slice(bytes);

        let mut chunks = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.handle_line(&line, &mut chunks);
        }
        chunks
    }

    /// Parse whatever is left once the body ends without a trailing newline.
    fn finish(&mut self) -> Vec<Result<StreamChunk>> {
        let line = std::mem::take(&mut self.buffer);
        let mut chunks = Vec::new();
        if !line.is_empty() {
            self.handle_line(&line, &mut chunks);
        }
        chunks
    }

    fn handle_line(&mut self, line: &[u8], chunks: &mut Vec<Result<StreamChunk>>) {
        if self.done {
            return;
        }
        let line = match std::str::from_utf8(line) {
            Ok(line) => line,
            Err(e) => {
                chunks.push(Err(AiError::StreamError {
                    message: format!("invalid UTF-8 in stream event: {}", e),
                    retryable: false,
                }));
                return;
            }
        };
        match parse_sse_line(line.trim_end()) {
            SseLine::Chunk(chunk) => chunks.push(chunk),
            SseLine::Done => self.done = true,
            SseLine::Skip => {}
        }
    }
}

enum SseLine {
    Chunk(Result<StreamChunk>),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }
    if data.is_empty() {
        return SseLine::Skip;
    }

    let chunk = serde_json::from_str::<OpenAIStreamChunk>(data)
        .map(|chunk| StreamChunk {
            id: chunk.id,
            choices: chunk
                .choices
                .into_iter()
                .map(|c| StreamChoice {
                    index: c.index,
                    delta: Delta {
                        role: c.delta.role.as_deref().map(Role::from_wire),
                        content: c.delta.content,
                    },
                    finish_reason: c.finish_reason,
                })
                .collect(),
            model: chunk.model,
        })
        .map_err(|e| AiError::StreamError {
            message: format!("unparseable stream event: {}", e),
            retryable: false,
        });

    SseLine::Chunk(chunk)
}
