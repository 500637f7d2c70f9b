use async_trait::async_trait;
use serde_json::Value;

use super::{pick_value, ChatMessageHistory, Memory};
use crate::{
    schema::{get_buffer_string, ChainValues, ChatMessage},
    Result,
};

pub const DEFAULT_MEMORY_KEY: &str = "history";

/// Keeps the whole conversation and hands it back under `memory_key`
#[derive(Debug, Clone)]
pub struct BufferMemory {
    pub(super) history: ChatMessageHistory,
    pub(super) human_prefix: String,
    pub(super) ai_prefix: String,
    pub(super) memory_key: String,
    pub(super) input_key: Option<String>,
    pub(super) output_key: Option<String>,
    pub(super) return_messages: bool,
}

impl Default for BufferMemory {
    fn default() -> Self {
        Self {
            history: ChatMessageHistory::new(),
            human_prefix: "Human".to_string(),
            ai_prefix: "AI".to_string(),
            memory_key: DEFAULT_MEMORY_KEY.to_string(),
            input_key: None,
            output_key: None,
            return_messages: false,
        }
    }
}

impl BufferMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn human_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.human_prefix = prefix.into();
        self
    }

    pub fn ai_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ai_prefix = prefix.into();
        self
    }

    pub fn memory_key(mut self, key: impl Into<String>) -> Self {
        self.memory_key = key.into();
        self
    }

    pub fn input_key(mut self, key: impl Into<String>) -> Self {
        self.input_key = Some(key.into());
        self
    }

    pub fn output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// Return the raw messages as JSON instead of a flattened transcript
    pub fn return_messages(mut self, return_messages: bool) -> Self {
        self.return_messages = return_messages;
        self
    }

    pub fn history(&self) -> &ChatMessageHistory {
        &self.history
    }

    pub(super) fn render(&self, messages: &[ChatMessage]) -> Result<ChainValues> {
        let value = if self.return_messages {
            serde_json::to_value(messages)?
        } else {
            Value::String(get_buffer_string(
                messages,
                &self.human_prefix,
                &self.ai_prefix,
            ))
        };
        let mut values = ChainValues::new();
        values.insert(self.memory_key.clone(), value);
        Ok(values)
    }
}

#[async_trait]
impl Memory for BufferMemory {
    fn memory_variables(&self) -> Vec<String> {
        vec![self.memory_key.clone()]
    }

    async fn load_memory_variables(&self, _inputs: &ChainValues) -> Result<ChainValues> {
        self.render(&self.history.messages()?)
    }

    async fn save_context(&self, inputs: &ChainValues, outputs: &ChainValues) -> Result<()> {
        let skip = self.memory_variables();
        let input = pick_value(inputs, self.input_key.as_deref(), &skip, "input")?;
        let output = pick_value(outputs, self.output_key.as_deref(), &[], "output")?;
        self.history.add_user_message(input)?;
        self.history.add_ai_message(output)
    }

    async fn clear(&self) -> Result<()> {
        self.history.clear()
    }
}
