use std::sync::{Arc, Mutex, MutexGuard};

use crate::{schema::ChatMessage, AiError, Result};

/// Shared, append-only list of chat messages
#[derive(Debug, Clone, Default)]
pub struct ChatMessageHistory {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl ChatMessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<ChatMessage>>> {
        self.messages.lock().map_err(|_| AiError::MemoryError {
            operation: "lock".to_string(),
            message: "message history lock poisoned".to_string(),
        })
    }

    pub fn add_message(&self, message: ChatMessage) -> Result<()> {
        self.lock()?.push(message);
        Ok(())
    }

    pub fn add_user_message(&self, content: impl Into<String>) -> Result<()> {
        self.add_message(ChatMessage::human(content))
    }

    pub fn add_ai_message(&self, content: impl Into<String>) -> Result<()> {
        self.add_message(ChatMessage::ai(content))
    }

    pub fn messages(&self) -> Result<Vec<ChatMessage>> {
        Ok(self.lock()?.clone())
    }

    /// The most recent `n` messages, oldest first
    pub fn last(&self, n: usize) -> Result<Vec<ChatMessage>> {
        let messages = self.lock()?;
        let start = messages.len().saturating_sub(n);
        Ok(messages[start..].to_vec())
    }

    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}
