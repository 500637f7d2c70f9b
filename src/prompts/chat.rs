use super::{BasePromptTemplate, PromptTemplate};
use crate::{
    schema::{ChainValues, ChatMessage, MessageRole, PromptValue},
    Result,
};

/// One templated message of a chat prompt
#[derive(Debug, Clone)]
pub struct MessagePromptTemplate {
    role: MessageRole,
    prompt: PromptTemplate,
}

impl MessagePromptTemplate {
    pub fn new(role: MessageRole, template: impl Into<String>) -> Result<Self> {
        Ok(Self {
            role,
            prompt: PromptTemplate::new(template)?,
        })
    }

    pub fn system(template: impl Into<String>) -> Result<Self> {
        Self::new(MessageRole::System, template)
    }

    pub fn human(template: impl Into<String>) -> Result<Self> {
        Self::new(MessageRole::Human, template)
    }

    pub fn ai(template: impl Into<String>) -> Result<Self> {
        Self::new(MessageRole::Ai, template)
    }

    pub fn format(&self, values: &ChainValues) -> Result<ChatMessage> {
        Ok(ChatMessage {
            role: self.role,
            content: self.prompt.format(values)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ChatPromptTemplate {
    messages: Vec<MessagePromptTemplate>,
}

impl ChatPromptTemplate {
    pub fn from_messages(messages: Vec<MessagePromptTemplate>) -> Self {
        Self { messages }
    }

    pub fn format_messages(&self, values: &ChainValues) -> Result<Vec<ChatMessage>> {
        self.messages.iter().map(|m| m.format(values)).collect()
    }
}

impl BasePromptTemplate for ChatPromptTemplate {
    fn input_variables(&self) -> Vec<String> {
        let mut variables: Vec<String> = Vec::new();
        for message in &self.messages {
            for variable in message.prompt.input_variables() {
                if !variables.contains(&variable) {
                    variables.push(variable);
                }
            }
        }
        variables
    }

    fn format_prompt(&self, values: &ChainValues) -> Result<PromptValue> {
        Ok(PromptValue::Chat(self.format_messages(values)?))
    }
}
