use async_trait::async_trait;
use serde_json::Value;

use super::{Chain, LlmChain};
use crate::{
    callbacks::CallbackManager,
    document_loaders::Document,
    llms::LanguageModel,
    prompts::PromptTemplate,
    schema::ChainValues,
    AiError, Result,
};

pub const DEFAULT_INPUT_KEY: &str = "input_documents";
pub const DEFAULT_DOCUMENT_VARIABLE: &str = "text";

pub const SUMMARIZE_TEMPLATE: &str = "Write a concise summary of the following:


\"{text}\"


CONCISE SUMMARY:";

/// Stuffs every document into one prompt variable and runs an [`LlmChain`]
pub struct StuffDocumentsChain {
    llm_chain: LlmChain,
    input_key: String,
    document_variable_name: String,
    callbacks: CallbackManager,
}

impl StuffDocumentsChain {
    pub fn new(llm_chain: LlmChain) -> Self {
        Self {
            llm_chain,
            input_key: DEFAULT_INPUT_KEY.to_string(),
            document_variable_name: DEFAULT_DOCUMENT_VARIABLE.to_string(),
            callbacks: CallbackManager::default(),
        }
    }

    pub fn document_variable_name(mut self, name: impl Into<String>) -> Self {
        self.document_variable_name = name.into();
        self
    }

    pub fn with_callbacks(mut self, callbacks: CallbackManager) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Build the chain inputs for a list of documents
    pub fn document_inputs(&self, documents: &[Document]) -> Result<ChainValues> {
        let mut inputs = ChainValues::new();
        inputs.insert(self.input_key.clone(), serde_json::to_value(documents)?);
        Ok(inputs)
    }
}

#[async_trait]
impl Chain for StuffDocumentsChain {
    fn chain_type(&self) -> &'static str {
        "stuff_documents_chain"
    }

    fn input_keys(&self) -> Vec<String> {
        vec![self.input_key.clone()]
    }

    fn output_keys(&self) -> Vec<String> {
        self.llm_chain.output_keys()
    }

    fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    async fn invoke(&self, mut inputs: ChainValues) -> Result<ChainValues> {
        let raw = inputs.remove(&self.input_key).unwrap_or(Value::Null);
        let documents: Vec<Document> =
            serde_json::from_value(raw).map_err(|e| AiError::InvalidRequest {
                message: format!("'{}' must be a list of documents: {}", self.input_key, e),
                field: Some(self.input_key.clone()),
            })?;

        let text = documents
            .iter()
            .map(|d| d.page_content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        inputs.insert(self.document_variable_name.clone(), Value::String(text));

        self.llm_chain.call(inputs).await
    }
}

/// A stuff chain over the concise-summary prompt
pub fn load_summarization_chain(llm: impl LanguageModel + 'static) -> Result<StuffDocumentsChain> {
    let prompt = PromptTemplate::new(SUMMARIZE_TEMPLATE)?;
    Ok(StuffDocumentsChain::new(LlmChain::new(prompt, llm)))
}
