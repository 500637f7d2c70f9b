//! Model wrappers that the chains and samples call.

mod chat;
mod openai;

pub use chat::ChatOpenAI;
pub use openai::OpenAI;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::json;
use uuid::Uuid;

use crate::{
    callbacks::CallbackManager, schema::PromptValue, AiError, CompletionProvider,
    CompletionRequest, Message, Result, Usage,
};

/// Anything a chain can hand a formatted prompt to
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn model_type(&self) -> &'static str;

    async fn predict(&self, prompt: &PromptValue) -> Result<String>;
}

/// Sampling options shared by both wrappers
#[derive(Debug, Clone, Default)]
pub struct ModelOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub stop: Option<Vec<String>>,
    pub streaming: bool,
}

impl ModelOptions {
    fn to_request(&self, default_model: &str, messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            model: self
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: Some(self.streaming),
            top_p: self.top_p,
            frequency_penalty: self.frequency_penalty,
            presence_penalty: self.presence_penalty,
            stop: self.stop.clone(),
            tools: None,
            tool_choice: None,
        }
    }
}

pub(crate) struct Completion {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

/// Send one conversation and collect the reply, streaming tokens to the
/// callbacks when the options ask for it.
pub(crate) async fn complete_messages(
    provider: &dyn CompletionProvider,
    options: &ModelOptions,
    messages: Vec<Message>,
    callbacks: &CallbackManager,
    run_id: Uuid,
) -> Result<Completion> {
    let request = options.to_request(provider.default_model(), messages);

    if !options.streaming {
        let response = provider.complete(request).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::MalformedResponse {
                message: "No choices in response".to_string(),
                raw_response: None,
            })?;
        return Ok(Completion {
            text: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason,
            usage: response.usage,
        });
    }

    let mut stream = provider.complete_stream(request).await?;
    let mut text = String::new();
    let mut finish_reason = None;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for choice in chunk.choices {
            if let Some(token) = choice.delta.content {
                callbacks.on_llm_new_token(&token, run_id)?;
                text.push_str(&token);
            }
            if choice.finish_reason.is_some() {
                finish_reason = choice.finish_reason;
            }
        }
    }

    Ok(Completion {
        text,
        finish_reason,
        usage: None,
    })
}

pub(crate) fn llm_output(model: &str, usage: Option<Usage>) -> serde_json::Value {
    match usage {
        Some(usage) => json!({ "model_name": model, "token_usage": usage }),
        None => json!({ "model_name": model }),
    }
}

/// Fluent setters over an `options: ModelOptions` field
macro_rules! model_option_setters {
    () => {
        pub fn model(mut self, model: impl Into<String>) -> Self {
            self.options.model = Some(model.into());
            self
        }

        pub fn temperature(mut self, temperature: f32) -> Self {
            self.options.temperature = Some(temperature);
            self
        }

        pub fn max_tokens(mut self, max_tokens: u32) -> Self {
            self.options.max_tokens = Some(max_tokens);
            self
        }

        pub fn top_p(mut self, top_p: f32) -> Self {
            self.options.top_p = Some(top_p);
            self
        }

        pub fn frequency_penalty(mut self, penalty: f32) -> Self {
            self.options.frequency_penalty = Some(penalty);
            self
        }

        pub fn presence_penalty(mut self, penalty: f32) -> Self {
            self.options.presence_penalty = Some(penalty);
            self
        }

        pub fn stop(mut self, stop: Vec<String>) -> Self {
            self.options.stop = Some(stop);
            self
        }

        /// Stream tokens through `on_llm_new_token` as they arrive
        pub fn streaming(mut self, streaming: bool) -> Self {
            self.options.streaming = streaming;
            self
        }

        pub fn callbacks(mut self, callbacks: crate::callbacks::CallbackManager) -> Self {
            self.callbacks = callbacks;
            self
        }

        pub fn options(&self) -> &crate::llms::ModelOptions {
            &self.options
        }

        pub fn model_name(&self) -> String {
            self.options
                .model
                .clone()
                .unwrap_or_else(|| self.provider.default_model().to_string())
        }
    };
}

pub(crate) use model_option_setters;
