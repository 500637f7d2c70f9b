use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::handler::{CallbackHandler, HandlerRegistry};
use crate::{
    schema::{AgentAction, AgentFinish, ChainValues, LlmResult, Serialized},
    AiError, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugCallbackConfig {
    pub always_verbose: bool,
    pub ignore_llm: bool,
    pub ignore_chain: bool,
}

impl Default for DebugCallbackConfig {
    fn default() -> Self {
        Self {
            always_verbose: true,
            ignore_llm: false,
            ignore_chain: false,
        }
    }
}

/// Prints model, chain and tool activity for human-readable tracing.
///
/// Error events, agent events and handler registration are not supported:
/// each of them fails with [`AiError::NotImplemented`] every time it is
/// invoked, which aborts the run that emitted it.
pub struct DebugCallbackHandler<W: Write + Send = Stdout> {
    out: Mutex<W>,
    config: DebugCallbackConfig,
}

impl DebugCallbackHandler<Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for DebugCallbackHandler<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> DebugCallbackHandler<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            config: DebugCallbackConfig::default(),
        }
    }

    pub fn config(mut self, config: DebugCallbackConfig) -> Self {
        self.config = config;
        self
    }

    /// Wrap in an `Arc` ready to hand to a [`super::CallbackManager`]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn write_with<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        let mut out = self.out.lock().map_err(|_| AiError::InternalError {
            message: "debug callback output lock poisoned".to_string(),
            component: Some("callbacks".to_string()),
        })?;
        f(&mut *out)?;
        Ok(())
    }

    fn write_json(&self, tag: &str, value: &impl serde::Serialize) -> Result<()> {
        let rendered = serde_json::to_string_pretty(value)?;
        self.write_with(|out| writeln!(out, "[{tag}] {rendered}"))
    }
}

impl<W: Write + Send> CallbackHandler for DebugCallbackHandler<W> {
    fn name(&self) -> &str {
        "debug_callback_handler"
    }

    fn always_verbose(&self) -> bool {
        self.config.always_verbose
    }

    fn ignore_llm(&self) -> bool {
        self.config.ignore_llm
    }

    fn ignore_chain(&self) -> bool {
        self.config.ignore_chain
    }

    fn on_llm_start(&self, _llm: &Serialized, prompts: &[String], _run_id: Uuid) -> Result<()> {
        self.write_with(|out| {
            for prompt in prompts {
                writeln!(out, "[llm/start] {prompt}")?;
            }
            Ok(())
        })
    }

    fn on_llm_new_token(&self, token: &str, _run_id: Uuid) -> Result<()> {
        self.write_with(|out| {
            write!(out, "{token}")?;
            out.flush()
        })
    }

    fn on_llm_end(&self, output: &LlmResult, _run_id: Uuid) -> Result<()> {
        self.write_json("llm/end", output)
    }

    fn on_llm_error(&self, _error: &AiError, _run_id: Uuid) -> Result<()> {
        Err(AiError::not_implemented("on_llm_error"))
    }

    fn on_chain_start(&self, _chain: &Serialized, inputs: &ChainValues, _run_id: Uuid) -> Result<()> {
        self.write_json("chain/start", inputs)
    }

    fn on_chain_end(&self, outputs: &ChainValues, _run_id: Uuid) -> Result<()> {
        self.write_json("chain/end", outputs)
    }

    fn on_chain_error(&self, _error: &AiError, _run_id: Uuid) -> Result<()> {
        Err(AiError::not_implemented("on_chain_error"))
    }

    fn on_tool_start(&self, tool: &Serialized, input: &str, _run_id: Uuid) -> Result<()> {
        self.write_with(|out| {
            writeln!(out, "[tool/start] {}", tool.name)?;
            writeln!(out, "[tool/start] input: {input}")
        })
    }

    fn on_tool_end(&self, output: &str, _run_id: Uuid) -> Result<()> {
        self.write_with(|out| writeln!(out, "[tool/end] {output}"))
    }

    fn on_tool_error(&self, _error: &AiError, _run_id: Uuid) -> Result<()> {
        Err(AiError::not_implemented("on_tool_error"))
    }

    fn on_text(&self, text: &str, _run_id: Uuid) -> Result<()> {
        self.write_with(|out| writeln!(out, "{text}"))
    }

    fn on_agent_action(&self, _action: &AgentAction, _run_id: Uuid) -> Result<()> {
        Err(AiError::not_implemented("on_agent_action"))
    }

    fn on_agent_end(&self, _finish: &AgentFinish, _run_id: Uuid) -> Result<()> {
        Err(AiError::not_implemented("on_agent_end"))
    }
}

impl<W: Write + Send> HandlerRegistry for DebugCallbackHandler<W> {
    fn add_handler(&mut self, _handler: Arc<dyn CallbackHandler>) -> Result<()> {
        Err(AiError::not_implemented("add_handler"))
    }

    fn remove_handler(&mut self, _handler: &Arc<dyn CallbackHandler>) -> Result<()> {
        Err(AiError::not_implemented("remove_handler"))
    }

    fn set_handlers(&mut self, _handlers: Vec<Arc<dyn CallbackHandler>>) -> Result<()> {
        Err(AiError::not_implemented("set_handlers"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DebugCallbackConfig::default();
        assert!(config.always_verbose);
        assert!(!config.ignore_llm);
        assert!(!config.ignore_chain);
    }

    #[test]
    fn test_new_token_has_no_newline() {
        let handler = DebugCallbackHandler::with_writer(Vec::new());
        handler.on_llm_new_token("Hel", Uuid::new_v4()).unwrap();
        handler.on_llm_new_token("lo", Uuid::new_v4()).unwrap();

        let out = handler.out.into_inner().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Hello");
    }

    #[test]
    fn test_config_flags_surface_through_trait() {
        let handler = DebugCallbackHandler::with_writer(Vec::new()).config(DebugCallbackConfig {
            always_verbose: false,
            ignore_llm: true,
            ignore_chain: true,
        });
        assert!(!handler.always_verbose());
        assert!(handler.ignore_llm());
        assert!(handler.ignore_chain());
        assert!(!handler.ignore_agent());
    }
}
