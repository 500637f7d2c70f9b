use async_trait::async_trait;

use super::{Chain, LlmChain};
use crate::{
    callbacks::CallbackManager,
    llms::LanguageModel,
    memory::{BufferMemory, Memory},
    prompts::PromptTemplate,
    schema::ChainValues,
    Result,
};

pub const DEFAULT_CONVERSATION_TEMPLATE: &str = "The following is a friendly conversation between a human and an AI. The AI is talkative and provides lots of specific details from its context. If the AI does not know the answer to a question, it truthfully says it does not know.

Current conversation:
{history}
Human: {input}
AI:";

/// An [`LlmChain`] over the conversation prompt with buffer memory attached
pub struct ConversationChain {
    inner: LlmChain,
}

impl ConversationChain {
    pub fn new(llm: impl LanguageModel + 'static) -> Result<Self> {
        Self::with_memory(llm, BufferMemory::new())
    }

    pub fn with_memory(
        llm: impl LanguageModel + 'static,
        memory: impl Memory + 'static,
    ) -> Result<Self> {
        let prompt = PromptTemplate::new(DEFAULT_CONVERSATION_TEMPLATE)?;
        Ok(Self {
            inner: LlmChain::new(prompt, llm)
                .output_key("response")
                .memory(memory),
        })
    }

    pub fn with_callbacks(mut self, callbacks: CallbackManager) -> Self {
        self.inner = self.inner.with_callbacks(callbacks);
        self
    }
}

#[async_trait]
impl Chain for ConversationChain {
    fn chain_type(&self) -> &'static str {
        "conversation_chain"
    }

    fn input_keys(&self) -> Vec<String> {
        self.inner.input_keys()
    }

    fn output_keys(&self) -> Vec<String> {
        self.inner.output_keys()
    }

    fn callbacks(&self) -> &CallbackManager {
        self.inner.callbacks()
    }

    async fn invoke(&self, inputs: ChainValues) -> Result<ChainValues> {
        self.inner.invoke(inputs).await
    }
}
