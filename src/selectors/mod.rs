//! Choosing which few-shot examples fit into a prompt.

mod length_based;

pub use length_based::{get_text_length, LengthBasedExampleSelector};

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{schema::ChainValues, Result};

/// One few-shot example: variable name to value
pub type Example = BTreeMap<String, String>;

pub trait ExampleSelector: Send + Sync {
    fn add_example(&mut self, example: Example) -> Result<()>;

    fn select_examples(&self, input: &ChainValues) -> Result<Vec<Example>>;
}

pub(crate) fn example_values(example: &Example) -> ChainValues {
    example
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}
