use serde_json::{Map, Value};

use super::OutputParser;
use crate::{AiError, Result};

/// Expects a JSON object with one string field per declared name
#[derive(Debug, Clone)]
pub struct StructuredOutputParser {
    fields: Vec<(String, String)>,
}

impl StructuredOutputParser {
    pub fn from_names_and_descriptions<N, D>(fields: impl IntoIterator<Item = (N, D)>) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, description)| (name.into(), description.into()))
                .collect(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    fn error(message: impl Into<String>, text: &str) -> AiError {
        AiError::OutputParserError {
            message: message.into(),
            llm_output: text.to_string(),
        }
    }
}

/// The body of the first fenced block, or the whole text when unfenced
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    // drop the language tag line, if any
    let body = match after.find('\n') {
        Some(newline) if !after[..newline].trim().contains('{') => &after[newline + 1..],
        _ => after,
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

impl OutputParser for StructuredOutputParser {
    type Output = Map<String, Value>;

    fn parse(&self, text: &str) -> Result<Map<String, Value>> {
        let json = strip_fence(text);
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Self::error(format!("invalid JSON: {}", e), text))?;

        let Value::Object(object) = value else {
            return Err(Self::error("expected a JSON object", text));
        };

        if let Some(missing) = self.names().find(|name| !object.contains_key(*name)) {
            return Err(Self::error(format!("missing key '{}'", missing), text));
        }
        Ok(object)
    }

    fn format_instructions(&self) -> String {
        let schema = self
            .fields
            .iter()
            .map(|(name, description)| format!("\t\"{}\": string // {}", name, description))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "The output should be a markdown code snippet formatted in the following schema:\n\n```json\n{{\n{}\n}}\n```\n",
            schema
        )
    }
}
