use super::{example_values, Example, ExampleSelector};
use crate::{
    prompts::PromptTemplate,
    schema::{value_to_string, ChainValues},
    Result,
};

pub const DEFAULT_MAX_LENGTH: usize = 2048;

/// Number of pieces left after splitting on newlines and spaces
pub fn get_text_length(text: &str) -> usize {
    text.split(['\n', ' ']).count()
}

/// Picks examples in order until the prompt would exceed `max_length`
pub struct LengthBasedExampleSelector {
    examples: Vec<Example>,
    example_prompt: PromptTemplate,
    example_text_lengths: Vec<usize>,
    max_length: usize,
}

impl LengthBasedExampleSelector {
    pub fn new(example_prompt: PromptTemplate) -> Self {
        Self {
            examples: Vec::new(),
            example_prompt,
            example_text_lengths: Vec::new(),
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    pub fn from_examples(examples: Vec<Example>, example_prompt: PromptTemplate) -> Result<Self> {
        let mut selector = Self::new(example_prompt);
        for example in examples {
            selector.add_example(example)?;
        }
        Ok(selector)
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }
}

impl ExampleSelector for LengthBasedExampleSelector {
    fn add_example(&mut self, example: Example) -> Result<()> {
        let text = self.example_prompt.format(&example_values(&example))?;
        self.example_text_lengths.push(get_text_length(&text));
        self.examples.push(example);
        Ok(())
    }

    fn select_examples(&self, input: &ChainValues) -> Result<Vec<Example>> {
        let input_text = input
            .values()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let mut remaining = self.max_length as i64 - get_text_length(&input_text) as i64;

        let mut selected = Vec::new();
        for (example, length) in self.examples.iter().zip(&self.example_text_lengths) {
            remaining -= *length as i64;
            if remaining < 0 {
                break;
            }
            selected.push(example.clone());
        }
        Ok(selected)
    }
}
