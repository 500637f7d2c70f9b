use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::{complete_messages, llm_output, model_option_setters, LanguageModel, ModelOptions};
use crate::{
    callbacks::{report_error, CallbackManager},
    config::Settings,
    providers::OpenAIProvider,
    schema::{Generation, LlmResult, PromptValue, Serialized},
    CompletionProvider, Message, Result, Usage,
};

/// Text-in, text-out wrapper around the chat completions endpoint.
///
/// Each prompt is sent as a single user message.
pub struct OpenAI {
    provider: Arc<dyn CompletionProvider>,
    options: ModelOptions,
    callbacks: CallbackManager,
}

impl OpenAI {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_provider(Arc::new(OpenAIProvider::new(api_key.into())))
    }

    /// Build from `OPENAI_API_KEY` and friends; fails before any request
    /// when the key is missing.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_settings(&Settings::from_env()?))
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let llm = Self::from_provider(Arc::new(OpenAIProvider::from_settings(settings)));
        match &settings.openai_model {
            Some(model) => llm.model(model.clone()),
            None => llm,
        }
    }

    pub fn from_provider(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            options: ModelOptions::default(),
            callbacks: CallbackManager::default(),
        }
    }

    model_option_setters!();

    /// Run every prompt and report the whole batch to the callbacks
    pub async fn generate(&self, prompts: &[String]) -> Result<LlmResult> {
        let run_id = Uuid::new_v4();
        self.callbacks
            .on_llm_start(&Serialized::new("openai"), prompts, run_id)?;

        match self.generate_inner(prompts, run_id).await {
            Ok(result) => {
                self.callbacks.on_llm_end(&result, run_id)?;
                Ok(result)
            }
            Err(err) => {
                report_error(self.callbacks.on_llm_error(&err, run_id), "on_llm_error");
                Err(err)
            }
        }
    }

    async fn generate_inner(&self, prompts: &[String], run_id: Uuid) -> Result<LlmResult> {
        let mut generations = Vec::with_capacity(prompts.len());
        let mut total_usage: Option<Usage> = None;

        for prompt in prompts {
            let completion = complete_messages(
                self.provider.as_ref(),
                &self.options,
                vec![Message::user(prompt.clone())],
                &self.callbacks,
                run_id,
            )
            .await?;

            if let Some(usage) = &completion.usage {
                total_usage.get_or_insert_with(Usage::default).add(usage);
            }

            generations.push(vec![Generation {
                text: completion.text,
                generation_info: completion
                    .finish_reason
                    .map(|reason| serde_json::json!({ "finish_reason": reason })),
            }]);
        }

        Ok(LlmResult {
            generations,
            llm_output: Some(llm_output(&self.model_name(), total_usage)),
        })
    }

    /// Complete a single prompt and return the generated text
    pub async fn call(&self, prompt: &str) -> Result<String> {
        let result = self.generate(&[prompt.to_string()]).await?;
        Ok(result.first_text().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl LanguageModel for OpenAI {
    fn model_type(&self) -> &'static str {
        "openai"
    }

    async fn predict(&self, prompt: &PromptValue) -> Result<String> {
        self.call(&prompt.to_string_prompt()).await
    }
}
