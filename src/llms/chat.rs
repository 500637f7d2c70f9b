use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::{complete_messages, llm_output, model_option_setters, LanguageModel, ModelOptions};
use crate::{
    callbacks::{report_error, CallbackManager},
    config::Settings,
    providers::OpenAIProvider,
    schema::{get_buffer_string, ChatMessage, Generation, LlmResult, PromptValue, Serialized},
    AiError, CompletionProvider, Message, Result, Tool, ToolChoice, Usage,
};

/// Chat-model wrapper: messages in, an AI message out
pub struct ChatOpenAI {
    provider: Arc<dyn CompletionProvider>,
    options: ModelOptions,
    callbacks: CallbackManager,
}

impl ChatOpenAI {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_provider(Arc::new(OpenAIProvider::new(api_key.into())))
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::from_settings(&Settings::from_env()?))
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let chat = Self::from_provider(Arc::new(OpenAIProvider::from_settings(settings)));
        match &settings.openai_model {
            Some(model) => chat.model(model.clone()),
            None => chat,
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

    pub async fn generate(&self, conversations: &[Vec<ChatMessage>]) -> Result<LlmResult> {
        let run_id = Uuid::new_v4();
        let prompts: Vec<String> = conversations
            .iter()
            .map(|messages| get_buffer_string(messages, "Human", "AI"))
            .collect();
        self.callbacks
            .on_llm_start(&Serialized::new("openai-chat"), &prompts, run_id)?;

        match self.generate_inner(conversations, run_id).await {
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

    async fn generate_inner(
        &self,
        conversations: &[Vec<ChatMessage>],
        run_id: Uuid,
    ) -> Result<LlmResult> {
        let mut generations = Vec::with_capacity(conversations.len());
        let mut total_usage: Option<Usage> = None;

        for messages in conversations {
            let completion = complete_messages(
                self.provider.as_ref(),
                &self.options,
                messages.iter().map(ChatMessage::to_wire).collect(),
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

    /// Send one conversation and return the model's reply
    pub async fn call(&self, messages: &[ChatMessage]) -> Result<ChatMessage> {
        let result = self.generate(&[messages.to_vec()]).await?;
        Ok(ChatMessage::ai(result.first_text().unwrap_or_default()))
    }

    /// One non-streaming round trip that offers the model `tools`.
    ///
    /// Traced like [`generate`](Self::generate); the raw assistant message is
    /// returned so the caller can act on its tool calls.
    pub(crate) async fn complete_with_tools(
        &self,
        messages: Vec<Message>,
        tools: Vec<Tool>,
    ) -> Result<Message> {
        let run_id = Uuid::new_v4();
        let transcript: Vec<ChatMessage> = messages.iter().map(ChatMessage::from_wire).collect();
        self.callbacks.on_llm_start(
            &Serialized::new("openai-chat"),
            &[get_buffer_string(&transcript, "Human", "AI")],
            run_id,
        )?;

        let mut request = self.options.to_request(self.provider.default_model(), messages);
        request.stream = Some(false);
        if !tools.is_empty() {
            request.tools = Some(tools);
            request.tool_choice = Some(ToolChoice::Auto);
        }

        let outcome = async {
            let response = self.provider.complete(request).await?;
            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| AiError::MalformedResponse {
                    message: "No choices in response".to_string(),
                    raw_response: None,
                })?;
            Ok::<_, AiError>((choice, response.usage))
        }
        .await;

        match outcome {
            Ok((choice, usage)) => {
                let result = LlmResult {
                    generations: vec![vec![Generation {
                        text: choice.message.as_text().unwrap_or_default().to_string(),
                        generation_info: choice
                            .finish_reason
                            .map(|reason| serde_json::json!({ "finish_reason": reason })),
                    }]],
                    llm_output: Some(llm_output(&self.model_name(), usage)),
                };
                self.callbacks.on_llm_end(&result, run_id)?;
                Ok(choice.message)
            }
            Err(err) => {
                report_error(self.callbacks.on_llm_error(&err, run_id), "on_llm_error");
                Err(err)
            }
        }
    }
}

#[async_trait]
impl LanguageModel for ChatOpenAI {
    fn model_type(&self) -> &'static str {
        "openai-chat"
    }

    async fn predict(&self, prompt: &PromptValue) -> Result<String> {
        let reply = self.call(&prompt.to_messages()).await?;
        Ok(reply.content)
    }
}
