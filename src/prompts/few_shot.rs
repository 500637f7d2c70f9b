use super::{BasePromptTemplate, PromptTemplate};
use crate::{
    schema::{ChainValues, PromptValue},
    selectors::{example_values, Example, ExampleSelector},
    Result,
};

pub const DEFAULT_EXAMPLE_SEPARATOR: &str = "\n\n";

enum Examples {
    Fixed(Vec<Example>),
    Selected(Box<dyn ExampleSelector>),
}

/// `prefix`, the formatted examples and `suffix`, joined by a separator.
///
/// Prefix and suffix are templates over the caller's values; each example
/// is rendered through `example_prompt`.
pub struct FewShotPromptTemplate {
    examples: Examples,
    example_prompt: PromptTemplate,
    prefix: PromptTemplate,
    suffix: PromptTemplate,
    example_separator: String,
}

impl FewShotPromptTemplate {
    pub fn with_examples(
        examples: Vec<Example>,
        example_prompt: PromptTemplate,
        prefix: &str,
        suffix: &str,
    ) -> Result<Self> {
        Self::build(Examples::Fixed(examples), example_prompt, prefix, suffix)
    }

    pub fn with_selector(
        selector: impl ExampleSelector + 'static,
        example_prompt: PromptTemplate,
        prefix: &str,
        suffix: &str,
    ) -> Result<Self> {
        Self::build(
            Examples::Selected(Box::new(selector)),
            example_prompt,
            prefix,
            suffix,
        )
    }

    fn build(
        examples: Examples,
        example_prompt: PromptTemplate,
        prefix: &str,
        suffix: &str,
    ) -> Result<Self> {
        Ok(Self {
            examples,
            example_prompt,
            prefix: PromptTemplate::new(prefix)?,
            suffix: PromptTemplate::new(suffix)?,
            example_separator: DEFAULT_EXAMPLE_SEPARATOR.to_string(),
        })
    }

    pub fn example_separator(mut self, separator: impl Into<String>) -> Self {
        self.example_separator = separator.into();
        self
    }

    pub fn format(&self, values: &ChainValues) -> Result<String> {
        let examples = match &self.examples {
            Examples::Fixed(examples) => examples.clone(),
            Examples::Selected(selector) => selector.select_examples(values)?,
        };

        let mut pieces = Vec::with_capacity(examples.len() + 2);
        let prefix = self.prefix.format(values)?;
        if !prefix.is_empty() {
            pieces.push(prefix);
        }
        for example in &examples {
            pieces.push(self.example_prompt.format(&example_values(example))?);
        }
        pieces.push(self.suffix.format(values)?);

        Ok(pieces.join(&self.example_separator))
    }
}

impl BasePromptTemplate for FewShotPromptTemplate {
    fn input_variables(&self) -> Vec<String> {
        let mut variables = self.prefix.input_variables();
        for variable in self.suffix.input_variables() {
            if !variables.contains(&variable) {
                variables.push(variable);
            }
        }
        variables
    }

    fn format_prompt(&self, values: &ChainValues) -> Result<PromptValue> {
        Ok(PromptValue::Text(self.format(values)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{schema::chain_values, selectors::LengthBasedExampleSelector};

    fn example(input: &str, output: &str) -> Example {
        Example::from([
            ("input".to_string(), input.to_string()),
            ("output".to_string(), output.to_string()),
        ])
    }

    fn example_prompt() -> PromptTemplate {
        PromptTemplate::new("Input: {input}\nOutput: {output}").unwrap()
    }

    #[test]
    fn test_fixed_examples() {
        let prompt = FewShotPromptTemplate::with_examples(
            vec![example("happy", "sad"), example("tall", "short")],
            example_prompt(),
            "Give the antonym of every input",
            "Input: {adjective}\nOutput:",
        )
        .unwrap();

        assert_eq!(prompt.input_variables(), vec!["adjective"]);
        assert_eq!(
            prompt.format(&chain_values([("adjective", "big")])).unwrap(),
            "Give the antonym of every input\n\nInput: happy\nOutput: sad\n\nInput: tall\nOutput: short\n\nInput: big\nOutput:"
        );
    }

    #[test]
    fn test_selector_drives_examples() {
        let selector = LengthBasedExampleSelector::from_examples(
            vec![example("happy", "sad"), example("tall", "short")],
            example_prompt(),
        )
        .unwrap()
        .max_length(6);

        let prompt = FewShotPromptTemplate::with_selector(
            selector,
            example_prompt(),
            "",
            "Input: {adjective}\nOutput:",
        )
        .unwrap()
        .example_separator("\n");

        assert_eq!(
            prompt.format(&chain_values([("adjective", "big")])).unwrap(),
            "Input: happy\nOutput: sad\nInput: big\nOutput:"
        );
    }
}
