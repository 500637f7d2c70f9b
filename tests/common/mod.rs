#![allow(dead_code)]

use async_trait::async_trait;
use chain_samples::{
    AiError, Choice, CompletionProvider, CompletionRequest, CompletionResponse, CompletionStream,
    Delta, FunctionCall, Message, Result, Role, StreamChoice, StreamChunk, ToolCall, ToolType,
    Usage,
};
use serde_json::json;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// In-process provider that replays scripted replies and records requests
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<CompletionResponse>>>,
    streams: Mutex<VecDeque<Vec<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, response: CompletionResponse) -> Self {
        self.replies.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(self, error: AiError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn stream(self, tokens: &[&str]) -> Self {
        self.streams
            .lock()
            .unwrap()
            .push_back(tokens.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AiError::InternalError {
                    message: "no scripted reply left".to_string(),
                    component: Some("test".to_string()),
                })
            })
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        self.requests.lock().unwrap().push(request);
        let tokens = self.streams.lock().unwrap().pop_front().unwrap_or_default();
        let last = tokens.len().saturating_sub(1);
        let chunks: Vec<Result<StreamChunk>> = tokens
            .into_iter()
            .enumerate()
            .map(|(i, token)| {
                Ok(StreamChunk {
                    id: "chunk".to_string(),
                    model: None,
                    choices: vec![StreamChoice {
                        index: 0,
                        delta: Delta {
                            role: None,
                            content: Some(token),
                        },
                        finish_reason: (i == last).then(|| "stop".to_string()),
                    }],
                })
            })
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn default_model(&self) -> &'static str {
        "scripted-model"
    }
}

fn response(message: Message, finish_reason: &str) -> CompletionResponse {
    CompletionResponse {
        id: "chatcmpl-test".to_string(),
        model: "scripted-model".to_string(),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason: Some(finish_reason.to_string()),
        }],
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}

pub fn text_response(text: &str) -> CompletionResponse {
    response(Message::assistant(text), "stop")
}

/// An assistant turn requesting `(id, tool, arguments)` calls
pub fn tool_call_response(calls: &[(&str, &str, &str)]) -> CompletionResponse {
    let message = Message {
        role: Role::Assistant,
        content: None,
        tool_calls: Some(
            calls
                .iter()
                .map(|(id, name, arguments)| ToolCall {
                    id: id.to_string(),
                    r#type: ToolType::Function,
                    function: FunctionCall {
                        name: name.to_string(),
                        arguments: arguments.to_string(),
                    },
                })
                .collect(),
        ),
        tool_call_id: None,
    };
    response(message, "tool_calls")
}

/// JSON body of a chat completion, for HTTP mocks
pub fn chat_completion_body(text: &str) -> String {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
    .to_string()
}

/// A cloneable in-memory sink for the debug handler
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
