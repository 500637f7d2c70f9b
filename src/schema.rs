use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Message, Role};

/// Named values flowing into and out of chains
pub type ChainValues = serde_json::Map<String, Value>;

/// Build [`ChainValues`] from key/value pairs
pub fn chain_values<I, K, V>(pairs: I) -> ChainValues
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Render a chain value the way a prompt wants to see it: strings verbatim,
/// everything else as compact JSON.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Identifies the component that emitted a callback event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Serialized {
    pub name: String,
}

impl Serialized {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_info: Option<Value>,
}

/// Output of one model invocation: one list of generations per prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmResult {
    pub generations: Vec<Vec<Generation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_output: Option<Value>,
}

impl LlmResult {
    /// Text of the first generation for the first prompt
    pub fn first_text(&self) -> Option<&str> {
        self.generations
            .first()
            .and_then(|g| g.first())
            .map(|g| g.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    pub tool: String,
    pub tool_input: String,
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFinish {
    pub return_values: ChainValues,
    pub log: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Human,
    Ai,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Human,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Ai,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub(crate) fn to_wire(&self) -> Message {
        match self.role {
            MessageRole::Human => Message::user(self.content.clone()),
            MessageRole::Ai => Message::assistant(self.content.clone()),
            MessageRole::System => Message::system(self.content.clone()),
        }
    }

    pub(crate) fn from_wire(message: &Message) -> Self {
        let content = message.as_text().unwrap_or_default().to_string();
        match message.role {
            Role::System => Self::system(content),
            Role::User => Self::human(content),
            Role::Assistant | Role::Tool => Self::ai(content),
        }
    }
}

/// Flatten messages into `"Human: ..\nAI: .."` form
pub fn get_buffer_string(messages: &[ChatMessage], human_prefix: &str, ai_prefix: &str) -> String {
    messages
        .iter()
        .map(|m| {
            let prefix = match m.role {
                MessageRole::Human => human_prefix,
                MessageRole::Ai => ai_prefix,
                MessageRole::System => "System",
            };
            format!("{}: {}", prefix, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A formatted prompt, ready for either kind of model
#[derive(Debug, Clone, PartialEq)]
pub enum PromptValue {
    Text(String),
    Chat(Vec<ChatMessage>),
}

impl PromptValue {
    pub fn to_string_prompt(&self) -> String {
        match self {
            PromptValue::Text(text) => text.clone(),
            PromptValue::Chat(messages) => get_buffer_string(messages, "Human", "AI"),
        }
    }

    pub fn to_messages(&self) -> Vec<ChatMessage> {
        match self {
            PromptValue::Text(text) => vec![ChatMessage::human(text.clone())],
            PromptValue::Chat(messages) => messages.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_buffer_string() {
        let messages = vec![
            ChatMessage::system("be nice"),
            ChatMessage::human("hi"),
            ChatMessage::ai("hello"),
        ];
        assert_eq!(
            get_buffer_string(&messages, "Human", "AI"),
            "System: be nice\nHuman: hi\nAI: hello"
        );
    }

    #[test]
    fn test_chain_values_helper() {
        let values = chain_values([("a", "x"), ("b", "y")]);
        assert_eq!(values["a"], json!("x"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("plain")), "plain");
        assert_eq!(value_to_string(&json!(3)), "3");
        assert_eq!(value_to_string(&Value::Null), "");
    }

    #[test]
    fn test_prompt_value_conversions() {
        let text = PromptValue::Text("hello".to_string());
        assert_eq!(text.to_messages(), vec![ChatMessage::human("hello")]);

        let chat = PromptValue::Chat(vec![ChatMessage::human("a"), ChatMessage::ai("b")]);
        assert_eq!(chat.to_string_prompt(), "Human: a\nAI: b");
    }
}
