use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use super::handler::{CallbackHandler, HandlerRegistry};
use crate::{
    schema::{AgentAction, AgentFinish, ChainValues, LlmResult, Serialized},
    AiError, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Llm,
    Chain,
    Agent,
    Text,
}

/// Fans lifecycle events out to a set of handlers.
///
/// Built by the caller and handed to whichever model, chain or agent should
/// be traced. Cloning shares the handlers.
#[derive(Clone, Default)]
pub struct CallbackManager {
    handlers: Vec<Arc<dyn CallbackHandler>>,
    verbose: bool,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_handler(handler: Arc<dyn CallbackHandler>) -> Self {
        Self {
            handlers: vec![handler],
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn handlers(&self) -> &[Arc<dyn CallbackHandler>] {
        &self.handlers
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn accepts(&self, handler: &dyn CallbackHandler, kind: EventKind) -> bool {
        if !self.verbose && !handler.always_verbose() {
            return false;
        }
        match kind {
            EventKind::Llm => !handler.ignore_llm(),
            EventKind::Chain => !handler.ignore_chain(),
            EventKind::Agent => !handler.ignore_agent(),
            EventKind::Text => true,
        }
    }

    fn dispatch<F>(&self, kind: EventKind, mut f: F) -> Result<()>
    where
        F: FnMut(&dyn CallbackHandler) -> Result<()>,
    {
        for handler in &self.handlers {
            if self.accepts(handler.as_ref(), kind) {
                f(handler.as_ref())?;
            }
        }
        Ok(())
    }

    pub fn on_llm_start(&self, llm: &Serialized, prompts: &[String], run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Llm, |h| h.on_llm_start(llm, prompts, run_id))
    }

    pub fn on_llm_new_token(&self, token: &str, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Llm, |h| h.on_llm_new_token(token, run_id))
    }

    pub fn on_llm_end(&self, output: &LlmResult, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Llm, |h| h.on_llm_end(output, run_id))
    }

    pub fn on_llm_error(&self, error: &AiError, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Llm, |h| h.on_llm_error(error, run_id))
    }

    pub fn on_chain_start(&self, chain: &Serialized, inputs: &ChainValues, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Chain, |h| h.on_chain_start(chain, inputs, run_id))
    }

    pub fn on_chain_end(&self, outputs: &ChainValues, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Chain, |h| h.on_chain_end(outputs, run_id))
    }

    pub fn on_chain_error(&self, error: &AiError, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Chain, |h| h.on_chain_error(error, run_id))
    }

    pub fn on_tool_start(&self, tool: &Serialized, input: &str, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Agent, |h| h.on_tool_start(tool, input, run_id))
    }

    pub fn on_tool_end(&self, output: &str, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Agent, |h| h.on_tool_end(output, run_id))
    }

    pub fn on_tool_error(&self, error: &AiError, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Agent, |h| h.on_tool_error(error, run_id))
    }

    pub fn on_text(&self, text: &str, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Text, |h| h.on_text(text, run_id))
    }

    pub fn on_agent_action(&self, action: &AgentAction, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Agent, |h| h.on_agent_action(action, run_id))
    }

    pub fn on_agent_end(&self, finish: &AgentFinish, run_id: Uuid) -> Result<()> {
        self.dispatch(EventKind::Agent, |h| h.on_agent_end(finish, run_id))
    }
}

impl HandlerRegistry for CallbackManager {
    fn add_handler(&mut self, handler: Arc<dyn CallbackHandler>) -> Result<()> {
        self.handlers.push(handler);
        Ok(())
    }

    fn remove_handler(&mut self, handler: &Arc<dyn CallbackHandler>) -> Result<()> {
        let target = Arc::as_ptr(handler) as *const ();
        self.handlers.retain(|h| Arc::as_ptr(h) as *const () != target);
        Ok(())
    }

    fn set_handlers(&mut self, handlers: Vec<Arc<dyn CallbackHandler>>) -> Result<()> {
        self.handlers = handlers;
        Ok(())
    }
}

/// Tell handlers about an error that already ended a run.
///
/// The original error is what the caller returns, so a handler failing here
/// is only logged.
pub(crate) fn report_error(result: Result<()>, event: &'static str) {
    if let Err(e) = result {
        warn!(event, error = %e, "callback handler failed while reporting an error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
        verbose: bool,
        ignore_llm: bool,
        ignore_agent: bool,
        fail_on_text: bool,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl CallbackHandler for Recorder {
        fn always_verbose(&self) -> bool {
            self.verbose
        }

        fn ignore_llm(&self) -> bool {
            self.ignore_llm
        }

        fn ignore_agent(&self) -> bool {
            self.ignore_agent
        }

        fn on_llm_start(&self, _llm: &Serialized, prompts: &[String], _run_id: Uuid) -> Result<()> {
            self.events.lock().unwrap().push(format!("llm_start:{}", prompts.len()));
            Ok(())
        }

        fn on_tool_start(&self, tool: &Serialized, _input: &str, _run_id: Uuid) -> Result<()> {
            self.events.lock().unwrap().push(format!("tool_start:{}", tool.name));
            Ok(())
        }

        fn on_text(&self, text: &str, _run_id: Uuid) -> Result<()> {
            if self.fail_on_text {
                return Err(AiError::not_implemented("on_text"));
            }
            self.events.lock().unwrap().push(format!("text:{text}"));
            Ok(())
        }
    }

    fn verbose_recorder() -> Arc<Recorder> {
        Arc::new(Recorder {
            verbose: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_quiet_manager_skips_non_verbose_handlers() {
        let quiet = Arc::new(Recorder::default());
        let loud = verbose_recorder();
        let mut manager = CallbackManager::new().with_verbose(false);
        manager.add_handler(quiet.clone()).unwrap();
        manager.add_handler(loud.clone()).unwrap();

        manager.on_text("hi", Uuid::new_v4()).unwrap();

        assert!(quiet.events().is_empty());
        assert_eq!(loud.events(), vec!["text:hi"]);
    }

    #[test]
    fn test_ignore_flags_route_events() {
        let handler = Arc::new(Recorder {
            verbose: true,
            ignore_llm: true,
            ignore_agent: true,
            ..Default::default()
        });
        let manager = CallbackManager::from_handler(handler.clone());
        let run_id = Uuid::new_v4();

        manager
            .on_llm_start(&Serialized::new("openai"), &["p".to_string()], run_id)
            .unwrap();
        manager
            .on_tool_start(&Serialized::new("search"), "q", run_id)
            .unwrap();
        manager.on_text("kept", run_id).unwrap();

        assert_eq!(handler.events(), vec!["text:kept"]);
    }

    #[test]
    fn test_first_failure_stops_dispatch() {
        let failing = Arc::new(Recorder {
            verbose: true,
            fail_on_text: true,
            ..Default::default()
        });
        let after = verbose_recorder();
        let mut manager = CallbackManager::new();
        let handlers: Vec<Arc<dyn CallbackHandler>> = vec![failing.clone(), after.clone()];
        manager.set_handlers(handlers).unwrap();

        let result = manager.on_text("boom", Uuid::new_v4());

        assert!(matches!(result, Err(AiError::NotImplemented { .. })));
        assert!(after.events().is_empty());
    }

    #[test]
    fn test_remove_handler() {
        let first: Arc<dyn CallbackHandler> = verbose_recorder();
        let second: Arc<dyn CallbackHandler> = verbose_recorder();
        let mut manager = CallbackManager::new();
        manager.add_handler(first.clone()).unwrap();
        manager.add_handler(second.clone()).unwrap();

        manager.remove_handler(&first).unwrap();

        assert_eq!(manager.handlers().len(), 1);
        assert_eq!(
            Arc::as_ptr(&manager.handlers()[0]) as *const (),
            Arc::as_ptr(&second) as *const ()
        );
    }
}
