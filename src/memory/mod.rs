//! Conversation memory for chains.

mod buffer;
mod history;
mod window;

pub use buffer::BufferMemory;
pub use history::ChatMessageHistory;
pub use window::BufferWindowMemory;

use async_trait::async_trait;

use crate::{
    schema::{value_to_string, ChainValues},
    AiError, Result,
};

/// State a chain reads before formatting its prompt and writes after the
/// model answers.
#[async_trait]
pub trait Memory: Send + Sync {
    /// Keys this memory adds to a chain's inputs
    fn memory_variables(&self) -> Vec<String>;

    async fn load_memory_variables(&self, inputs: &ChainValues) -> Result<ChainValues>;

    async fn save_context(&self, inputs: &ChainValues, outputs: &ChainValues) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Find the single value a memory should record.
///
/// An explicit key wins; otherwise the map must hold exactly one entry
/// once `skip` keys are removed.
pub(crate) fn pick_value(
    values: &ChainValues,
    key: Option<&str>,
    skip: &[String],
    what: &str,
) -> Result<String> {
    if let Some(key) = key {
        return values
            .get(key)
            .map(value_to_string)
            .ok_or_else(|| AiError::MemoryError {
                operation: "save_context".to_string(),
                message: format!("{} key '{}' not found", what, key),
            });
    }

    let mut candidates = values.iter().filter(|(k, _)| !skip.contains(k));
    match (candidates.next(), candidates.next()) {
        (Some((_, value)), None) => Ok(value_to_string(value)),
        (None, _) => Err(AiError::MemoryError {
            operation: "save_context".to_string(),
            message: format!("no {} value to save", what),
        }),
        (Some(_), Some(_)) => Err(AiError::MemoryError {
            operation: "save_context".to_string(),
            message: format!("multiple {} keys; set the {} key explicitly", what, what),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::chain_values;

    #[test]
    fn test_pick_value_single_key() {
        let values = chain_values([("input", "hi"), ("history", "")]);
        let picked = pick_value(&values, None, &["history".to_string()], "input").unwrap();
        assert_eq!(picked, "hi");
    }

    #[test]
    fn test_pick_value_ambiguous() {
        let values = chain_values([("a", "1"), ("b", "2")]);
        assert!(matches!(
            pick_value(&values, None, &[], "input"),
            Err(AiError::MemoryError { .. })
        ));
        assert_eq!(pick_value(&values, Some("b"), &[], "input").unwrap(), "2");
    }
}
