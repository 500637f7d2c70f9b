use std::collections::BTreeMap;

use super::BasePromptTemplate;
use crate::{
    schema::{value_to_string, ChainValues, PromptValue},
    AiError, Result,
};

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// An f-string style template: `{name}` placeholders, `{{`/`}}` escapes
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    segments: Vec<Segment>,
    input_variables: Vec<String>,
    partial_variables: BTreeMap<String, String>,
}

impl PromptTemplate {
    /// Parse a template, inferring its input variables in order of appearance
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let segments = parse(&template)?;

        let mut input_variables: Vec<String> = Vec::new();
        for segment in &segments {
            if let Segment::Variable(name) = segment {
                if !input_variables.contains(name) {
                    input_variables.push(name.clone());
                }
            }
        }

        Ok(Self {
            template,
            segments,
            input_variables,
            partial_variables: BTreeMap::new(),
        })
    }

    /// Parse a template and check it against an explicit variable list
    pub fn with_input_variables(template: impl Into<String>, variables: &[&str]) -> Result<Self> {
        let prompt = Self::new(template)?;
        if let Some(undeclared) = prompt
            .input_variables
            .iter()
            .find(|v| !variables.contains(&v.as_str()))
        {
            return Err(AiError::TemplateError {
                message: format!("placeholder '{{{}}}' is not a declared input variable", undeclared),
            });
        }
        Ok(Self {
            input_variables: variables.iter().map(|v| v.to_string()).collect(),
            ..prompt
        })
    }

    /// Pre-bind a variable so callers no longer have to supply it
    pub fn partial(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.input_variables.retain(|v| v != &name);
        self.partial_variables.insert(name, value.into());
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn format(&self, values: &ChainValues) -> Result<String> {
        let mut out = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => {
                    if let Some(value) = values.get(name) {
                        out.push_str(&value_to_string(value));
                    } else if let Some(value) = self.partial_variables.get(name) {
                        out.push_str(value);
                    } else {
                        return Err(AiError::MissingPromptVariable {
                            variable: name.clone(),
                        });
                    }
                }
            }
        }
        Ok(out)
    }
}

impl BasePromptTemplate for PromptTemplate {
    fn input_variables(&self) -> Vec<String> {
        self.input_variables.clone()
    }

    fn format_prompt(&self, values: &ChainValues) -> Result<PromptValue> {
        Ok(PromptValue::Text(self.format(values)?))
    }
}

fn parse(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                let name = name.trim().to_string();
                if !closed {
                    return Err(AiError::TemplateError {
                        message: format!("unclosed '{{' in template: {}", template),
                    });
                }
                if name.is_empty() || name.contains('{') {
                    return Err(AiError::TemplateError {
                        message: format!("invalid placeholder '{{{}}}'", name),
                    });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name));
            }
            '}' => {
                return Err(AiError::TemplateError {
                    message: format!("single '}}' in template: {}", template),
                });
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
