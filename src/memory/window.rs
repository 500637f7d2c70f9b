use async_trait::async_trait;

use super::{BufferMemory, ChatMessageHistory, Memory};
use crate::{schema::ChainValues, Result};

pub const DEFAULT_WINDOW: usize = 5;

/// Like [`BufferMemory`], but only the last `k` exchanges are returned
#[derive(Debug, Clone)]
pub struct BufferWindowMemory {
    buffer: BufferMemory,
    k: usize,
}

impl Default for BufferWindowMemory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl BufferWindowMemory {
    pub fn new(k: usize) -> Self {
        Self {
            buffer: BufferMemory::new(),
            k,
        }
    }

    /// Wrap a configured buffer, keeping its prefixes and keys
    pub fn from_buffer(buffer: BufferMemory, k: usize) -> Self {
        Self { buffer, k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn history(&self) -> &ChatMessageHistory {
        self.buffer.history()
    }
}

#[async_trait]
impl Memory for BufferWindowMemory {
    fn memory_variables(&self) -> Vec<String> {
        self.buffer.memory_variables()
    }

    async fn load_memory_variables(&self, _inputs: &ChainValues) -> Result<ChainValues> {
        let messages = self.buffer.history.last(self.k * 2)?;
        self.buffer.render(&messages)
    }

    async fn save_context(&self, inputs: &ChainValues, outputs: &ChainValues) -> Result<()> {
        self.buffer.save_context(inputs, outputs).await
    }

    async fn clear(&self) -> Result<()> {
        self.buffer.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::chain_values;
    use serde_json::json;

    #[tokio::test]
    async fn test_window_keeps_last_k_exchanges() {
        let memory = BufferWindowMemory::new(1);
        for (input, output) in [("one", "1"), ("two", "2")] {
            memory
                .save_context(
                    &chain_values([("input", input)]),
                    &chain_values([("output", output)]),
                )
                .await
                .unwrap();
        }

        let vars = memory.load_memory_variables(&ChainValues::new()).await.unwrap();
        assert_eq!(vars["history"], json!("Human: two\nAI: 2"));
        assert_eq!(memory.history().messages().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_zero_window_is_empty() {
        let memory = BufferWindowMemory::new(0);
        memory
            .save_context(&chain_values([("input", "a")]), &chain_values([("output", "b")]))
            .await
            .unwrap();
        let vars = memory.load_memory_variables(&ChainValues::new()).await.unwrap();
        assert_eq!(vars["history"], json!(""));
    }
}
