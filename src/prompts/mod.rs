//! Prompt templates: plain text, chat and few-shot.

mod chat;
mod few_shot;
mod template;

pub use chat::{ChatPromptTemplate, MessagePromptTemplate};
pub use few_shot::FewShotPromptTemplate;
pub use template::PromptTemplate;

use crate::{
    schema::{ChainValues, PromptValue},
    Result,
};

/// Common surface of every template a chain can format
pub trait BasePromptTemplate: Send + Sync {
    fn input_variables(&self) -> Vec<String>;

    fn format_prompt(&self, values: &ChainValues) -> Result<PromptValue>;
}
