use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::Chain;
use crate::{
    callbacks::CallbackManager,
    llms::LanguageModel,
    memory::Memory,
    prompts::BasePromptTemplate,
    schema::ChainValues,
    Result,
};

pub const DEFAULT_OUTPUT_KEY: &str = "text";

/// Format a prompt, send it to a model, return the text under `output_key`
pub struct LlmChain {
    prompt: Box<dyn BasePromptTemplate>,
    llm: Arc<dyn LanguageModel>,
    output_key: String,
    memory: Option<Arc<dyn Memory>>,
    callbacks: CallbackManager,
}

impl LlmChain {
    pub fn new(
        prompt: impl BasePromptTemplate + 'static,
        llm: impl LanguageModel + 'static,
    ) -> Self {
        Self::with_shared_llm(prompt, Arc::new(llm))
    }

    pub fn with_shared_llm(
        prompt: impl BasePromptTemplate + 'static,
        llm: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            prompt: Box::new(prompt),
            llm,
            output_key: DEFAULT_OUTPUT_KEY.to_string(),
            memory: None,
            callbacks: CallbackManager::default(),
        }
    }

    pub fn output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    pub fn memory(mut self, memory: impl Memory + 'static) -> Self {
        self.memory = Some(Arc::new(memory));
        self
    }

    pub fn with_callbacks(mut self, callbacks: CallbackManager) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Run the chain and return just the generated text
    pub async fn predict(&self, inputs: ChainValues) -> Result<String> {
        let mut outputs = self.call(inputs).await?;
        Ok(match outputs.remove(&self.output_key) {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => String::new(),
        })
    }
}

#[async_trait]
impl Chain for LlmChain {
    fn chain_type(&self) -> &'static str {
        "llm_chain"
    }

    fn input_keys(&self) -> Vec<String> {
        let memory_keys = self
            .memory
            .as_ref()
            .map(|m| m.memory_variables())
            .unwrap_or_default();
        self.prompt
            .input_variables()
            .into_iter()
            .filter(|v| !memory_keys.contains(v))
            .collect()
    }

    fn output_keys(&self) -> Vec<String> {
        vec![self.output_key.clone()]
    }

    fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    async fn invoke(&self, inputs: ChainValues) -> Result<ChainValues> {
        let mut values = inputs.clone();
        if let Some(memory) = &self.memory {
            values.extend(memory.load_memory_variables(&inputs).await?);
        }

        let prompt = self.prompt.format_prompt(&values)?;
        let text = self.llm.predict(&prompt).await?;

        let mut outputs = ChainValues::new();
        outputs.insert(self.output_key.clone(), Value::String(text));

        if let Some(memory) = &self.memory {
            memory.save_context(&inputs, &outputs).await?;
        }
        Ok(outputs)
    }
}
