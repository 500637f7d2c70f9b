use std::sync::Arc;
use uuid::Uuid;

use crate::{
    schema::{AgentAction, AgentFinish, ChainValues, LlmResult, Serialized},
    AiError, Result,
};

/// Hooks invoked at lifecycle points of model, chain, tool and agent runs.
///
/// Every hook defaults to doing nothing, so a handler only overrides the
/// events it cares about. Returning an error aborts the run that emitted
/// the event.
pub trait CallbackHandler: Send + Sync {
    fn name(&self) -> &str {
        "callback_handler"
    }

    /// Receive events even when the emitting manager is not verbose
    fn always_verbose(&self) -> bool {
        false
    }

    fn ignore_llm(&self) -> bool {
        false
    }

    fn ignore_chain(&self) -> bool {
        false
    }

    /// Covers both tool and agent events
    fn ignore_agent(&self) -> bool {
        false
    }

    fn on_llm_start(&self, _llm: &Serialized, _prompts: &[String], _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_llm_new_token(&self, _token: &str, _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_llm_end(&self, _output: &LlmResult, _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_llm_error(&self, _error: &AiError, _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_chain_start(&self, _chain: &Serialized, _inputs: &ChainValues, _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_chain_end(&self, _outputs: &ChainValues, _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_chain_error(&self, _error: &AiError, _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_tool_start(&self, _tool: &Serialized, _input: &str, _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_tool_end(&self, _output: &str, _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_tool_error(&self, _error: &AiError, _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_text(&self, _text: &str, _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_agent_action(&self, _action: &AgentAction, _run_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn on_agent_end(&self, _finish: &AgentFinish, _run_id: Uuid) -> Result<()> {
        Ok(())
    }
}

/// Adding and removing handlers on something that dispatches events
pub trait HandlerRegistry {
    fn add_handler(&mut self, handler: Arc<dyn CallbackHandler>) -> Result<()>;

    fn remove_handler(&mut self, handler: &Arc<dyn CallbackHandler>) -> Result<()>;

    fn set_handlers(&mut self, handlers: Vec<Arc<dyn CallbackHandler>>) -> Result<()>;
}
