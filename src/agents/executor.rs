use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::ToolRegistry;
use crate::{
    callbacks::{report_error, CallbackManager},
    chains::Chain,
    llms::ChatOpenAI,
    schema::{chain_values, value_to_string, AgentAction, AgentFinish, ChainValues, Serialized},
    AiError, Message, Result, ToolCall,
};

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Lets the model call tools until it answers in plain text.
///
/// Model events go to the model's own callbacks; agent and tool events go
/// to the executor's.
pub struct AgentExecutor {
    llm: ChatOpenAI,
    tools: ToolRegistry,
    system_prompt: Option<String>,
    max_iterations: usize,
    callbacks: CallbackManager,
}

impl AgentExecutor {
    pub fn new(llm: ChatOpenAI, tools: ToolRegistry) -> Self {
        Self {
            llm,
            tools,
            system_prompt: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            callbacks: CallbackManager::default(),
        }
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_callbacks(mut self, callbacks: CallbackManager) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    async fn run_tool(&self, call: &ToolCall, run_id: Uuid) -> Result<String> {
        let name = &call.function.name;
        let tool = self.tools.get(name).ok_or_else(|| AiError::ToolNotFound {
            tool_name: name.clone(),
            available_tools: self.tools.names(),
        })?;

        self.callbacks
            .on_tool_start(&Serialized::new(name.as_str()), &call.function.arguments, run_id)?;
        match tool.call(&call.function.arguments).await {
            Ok(output) => {
                self.callbacks.on_tool_end(&output, run_id)?;
                Ok(output)
            }
            Err(err) => {
                report_error(self.callbacks.on_tool_error(&err, run_id), "on_tool_error");
                Err(err)
            }
        }
    }
}

#[async_trait]
impl Chain for AgentExecutor {
    fn chain_type(&self) -> &'static str {
        "agent_executor"
    }

    fn input_keys(&self) -> Vec<String> {
        vec!["input".to_string()]
    }

    fn output_keys(&self) -> Vec<String> {
        vec!["output".to_string()]
    }

    fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    async fn invoke(&self, inputs: ChainValues) -> Result<ChainValues> {
        let input = inputs.get("input").map(value_to_string).unwrap_or_default();
        let run_id = Uuid::new_v4();

        let mut messages = Vec::new();
        if let Some(system) = &self.system_prompt {
            messages.push(Message::system(system.clone()));
        }
        messages.push(Message::user(input));

        for _ in 0..self.max_iterations {
            let reply = self
                .llm
                .complete_with_tools(messages.clone(), self.tools.definitions())
                .await?;

            let calls = reply.tool_calls.clone().unwrap_or_default();
            if calls.is_empty() {
                let text = reply.content.unwrap_or_default();
                let finish = AgentFinish {
                    return_values: chain_values([("output", Value::String(text.clone()))]),
                    log: text,
                };
                self.callbacks.on_agent_end(&finish, run_id)?;
                return Ok(finish.return_values);
            }

            let log = reply.content.clone().unwrap_or_default();
            messages.push(reply);
            for call in calls {
                let action = AgentAction {
                    tool: call.function.name.clone(),
                    tool_input: call.function.arguments.clone(),
                    log: log.clone(),
                };
                self.callbacks.on_agent_action(&action, run_id)?;

                let output = self.run_tool(&call, run_id).await?;
                messages.push(Message::tool_result(call.id.clone(), output));
            }
        }

        Err(AiError::MaxIterationsReached {
            iterations: self.max_iterations,
        })
    }
}
