use super::OutputParser;
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct CommaSeparatedListOutputParser;

impl CommaSeparatedListOutputParser {
    pub fn new() -> Self {
        Self
    }
}

impl OutputParser for CommaSeparatedListOutputParser {
    type Output = Vec<String>;

    fn parse(&self, text: &str) -> Result<Vec<String>> {
        Ok(text
            .trim()
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect())
    }

    fn format_instructions(&self) -> String {
        "Your response should be a list of comma separated values, eg: `foo, bar, baz`".to_string()
    }
}
