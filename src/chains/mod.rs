//! Chains: named-value in, named-value out, traced through callbacks.

mod combine_documents;
mod conversation;
mod llm_chain;

pub use combine_documents::{load_summarization_chain, StuffDocumentsChain};
pub use conversation::ConversationChain;
pub use llm_chain::LlmChain;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    callbacks::{report_error, CallbackManager},
    schema::{chain_values, value_to_string, ChainValues, Serialized},
    AiError, Result,
};

#[async_trait]
pub trait Chain: Send + Sync {
    fn chain_type(&self) -> &'static str;

    /// Keys the caller must supply
    fn input_keys(&self) -> Vec<String>;

    fn output_keys(&self) -> Vec<String>;

    fn callbacks(&self) -> &CallbackManager;

    /// The chain body, without validation or tracing
    async fn invoke(&self, inputs: ChainValues) -> Result<ChainValues>;

    /// Validate inputs and run the body between `on_chain_start` and
    /// `on_chain_end` (or `on_chain_error`).
    async fn call(&self, inputs: ChainValues) -> Result<ChainValues> {
        if let Some(missing) = self
            .input_keys()
            .into_iter()
            .find(|key| !inputs.contains_key(key))
        {
            return Err(AiError::InvalidRequest {
                message: format!("missing input key '{}' for {}", missing, self.chain_type()),
                field: Some(missing),
            });
        }

        let run_id = Uuid::new_v4();
        let callbacks = self.callbacks();
        callbacks.on_chain_start(&Serialized::new(self.chain_type()), &inputs, run_id)?;

        match self.invoke(inputs).await {
            Ok(outputs) => {
                callbacks.on_chain_end(&outputs, run_id)?;
                Ok(outputs)
            }
            Err(err) => {
                report_error(callbacks.on_chain_error(&err, run_id), "on_chain_error");
                Err(err)
            }
        }
    }

    /// Shorthand for chains with exactly one input and one output
    async fn run(&self, input: &str) -> Result<String> {
        let input_key = single_key(self.input_keys(), "input", self.chain_type())?;
        let output_key = single_key(self.output_keys(), "output", self.chain_type())?;

        let outputs = self.call(chain_values([(input_key, input)])).await?;
        outputs
            .get(&output_key)
            .map(value_to_string)
            .ok_or_else(|| AiError::MalformedResponse {
                message: format!("chain returned no '{}' value", output_key),
                raw_response: None,
            })
    }
}

fn single_key(keys: Vec<String>, what: &str, chain_type: &str) -> Result<String> {
    match <[String; 1]>::try_from(keys) {
        Ok([key]) => Ok(key),
        Err(keys) => Err(AiError::InvalidRequest {
            message: format!(
                "run() needs exactly one {} key but {} has {:?}",
                what, chain_type, keys
            ),
            field: None,
        }),
    }
}
