mod common;

use async_trait::async_trait;
use chain_samples::{
    agents::{AgentExecutor, CalculatorTool, SerpApiTool, Tool, ToolRegistry},
    callbacks::{CallbackHandler, CallbackManager, DebugCallbackHandler},
    chains::Chain,
    llms::ChatOpenAI,
    schema::{chain_values, AgentAction, AgentFinish, Serialized},
    AiError, Role, ToolChoice,
};
use common::{text_response, tool_call_response, ScriptedProvider, SharedBuffer};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Records the agent-side events it sees, in order
#[derive(Default)]
struct EventLog(Mutex<Vec<String>>);

impl EventLog {
    fn push(&self, event: String) -> chain_samples::Result<()> {
        self.0.lock().unwrap().push(event);
        Ok(())
    }

    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl CallbackHandler for EventLog {
    fn always_verbose(&self) -> bool {
        true
    }

    fn on_agent_action(&self, action: &AgentAction, _run_id: Uuid) -> chain_samples::Result<()> {
        self.push(format!("action:{}", action.tool))
    }

    fn on_tool_start(&self, tool: &Serialized, input: &str, _run_id: Uuid) -> chain_samples::Result<()> {
        self.push(format!("tool_start:{}:{}", tool.name, input))
    }

    fn on_tool_end(&self, output: &str, _run_id: Uuid) -> chain_samples::Result<()> {
        self.push(format!("tool_end:{}", output))
    }

    fn on_tool_error(&self, _error: &AiError, _run_id: Uuid) -> chain_samples::Result<()> {
        self.push("tool_error".to_string())
    }

    fn on_agent_end(&self, finish: &AgentFinish, _run_id: Uuid) -> chain_samples::Result<()> {
        self.push(format!("end:{}", finish.log))
    }
}

struct Failing;

#[async_trait]
impl Tool for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    async fn call(&self, _arguments: &str) -> chain_samples::Result<String> {
        Err(AiError::ToolExecutionError {
            tool_name: "failing".to_string(),
            message: "nope".to_string(),
        })
    }
}

#[tokio::test]
async fn test_agent_dispatches_tool_calls() {
    let provider = ScriptedProvider::new()
        .reply(tool_call_response(&[(
            "call_1",
            "calculator",
            r#"{"operation":"multiply","a":6,"b":7}"#,
        )]))
        .reply(text_response("The answer is 42."))
        .shared();
    let log = Arc::new(EventLog::default());

    let executor = AgentExecutor::new(
        ChatOpenAI::from_provider(provider.clone()),
        ToolRegistry::new().with(CalculatorTool),
    )
    .with_callbacks(CallbackManager::from_handler(log.clone()));

    let output = executor.run("What is 6 times 7?").await.unwrap();
    assert_eq!(output, "The answer is 42.");

    assert_eq!(
        log.events(),
        vec![
            "action:calculator",
            r#"tool_start:calculator:{"operation":"multiply","a":6,"b":7}"#,
            "tool_end:42",
            "end:The answer is 42.",
        ]
    );

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tool_choice, Some(ToolChoice::Auto));
    assert_eq!(requests[0].tools.as_ref().unwrap()[0].function.name, "calculator");

    let followup = &requests[1].messages;
    assert_eq!(followup.len(), 3);
    assert_eq!(followup[1].role, Role::Assistant);
    assert_eq!(followup[2].role, Role::Tool);
    assert_eq!(followup[2].tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(followup[2].as_text(), Some("42"));
}

#[tokio::test]
async fn test_agent_stops_after_max_iterations() {
    let call = ("call", "calculator", r#"{"operation":"add","a":1,"b":1}"#);
    let provider = ScriptedProvider::new()
        .reply(tool_call_response(&[call]))
        .reply(tool_call_response(&[call]))
        .shared();

    let executor = AgentExecutor::new(
        ChatOpenAI::from_provider(provider),
        ToolRegistry::new().with(CalculatorTool),
    )
    .max_iterations(2);

    let err = executor.run("loop forever").await.unwrap_err();
    assert!(matches!(err, AiError::MaxIterationsReached { iterations: 2 }));
}

#[tokio::test]
async fn test_unknown_tool_is_reported() {
    let provider = ScriptedProvider::new()
        .reply(tool_call_response(&[("c", "teleport", "{}")]))
        .shared();
    let executor = AgentExecutor::new(
        ChatOpenAI::from_provider(provider),
        ToolRegistry::new().with(CalculatorTool),
    );

    match executor.run("beam me up").await.unwrap_err() {
        AiError::ToolNotFound {
            tool_name,
            available_tools,
        } => {
            assert_eq!(tool_name, "teleport");
            assert_eq!(available_tools, vec!["calculator"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_tool_failure_aborts_after_tool_error_event() {
    let provider = ScriptedProvider::new()
        .reply(tool_call_response(&[("c", "failing", "{}")]))
        .shared();
    let log = Arc::new(EventLog::default());
    let executor = AgentExecutor::new(
        ChatOpenAI::from_provider(provider),
        ToolRegistry::new().with(Failing),
    )
    .with_callbacks(CallbackManager::from_handler(log.clone()));

    let err = executor.run("try it").await.unwrap_err();
    assert!(matches!(err, AiError::ToolExecutionError { .. }));
    assert_eq!(log.events(), vec!["action:failing", "tool_start:failing:{}", "tool_error"]);
}

#[tokio::test]
async fn test_debug_handler_on_model_only_traces_round_trips() {
    let provider = ScriptedProvider::new()
        .reply(tool_call_response(&[(
            "c",
            "calculator",
            r#"{"operation":"subtract","a":10,"b":4}"#,
        )]))
        .reply(text_response("6"))
        .shared();
    let buffer = SharedBuffer::new();
    let model = ChatOpenAI::from_provider(provider).callbacks(CallbackManager::from_handler(
        DebugCallbackHandler::with_writer(buffer.clone()).shared(),
    ));

    let executor = AgentExecutor::new(model, ToolRegistry::new().with(CalculatorTool));
    assert_eq!(executor.run("10 - 4?").await.unwrap(), "6");

    let out = buffer.contents();
    assert_eq!(out.matches("[llm/start]").count(), 2);
    assert_eq!(out.matches("[llm/end]").count(), 2);
    assert!(!out.contains("[tool/start]"));
}

#[tokio::test]
async fn test_debug_handler_on_executor_aborts_on_agent_action() {
    let provider = ScriptedProvider::new()
        .reply(tool_call_response(&[(
            "c",
            "calculator",
            r#"{"operation":"add","a":1,"b":2}"#,
        )]))
        .shared();
    let executor = AgentExecutor::new(
        ChatOpenAI::from_provider(provider),
        ToolRegistry::new().with(CalculatorTool),
    )
    .with_callbacks(CallbackManager::from_handler(
        DebugCallbackHandler::with_writer(SharedBuffer::new()).shared(),
    ));

    let err = executor
        .call(chain_values([("input", "1 + 2")]))
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::NotImplemented { feature } if feature == "on_agent_action"));
}

#[tokio::test]
async fn test_serpapi_prefers_answer_box() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "olivia wilde boyfriend".into()),
            Matcher::UrlEncoded("api_key".into(), "serp-key".into()),
            Matcher::UrlEncoded("engine".into(), "google".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "answer_box": { "answer": "Harry Styles" },
                "organic_results": [{ "snippet": "something else" }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let tool = SerpApiTool::new("serp-key").with_base_url(server.url());
    let answer = tool
        .call(r#"{"query": "olivia wilde boyfriend"}"#)
        .await
        .unwrap();
    assert_eq!(answer, "Harry Styles");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_serpapi_accepts_bare_query_and_reports_http_errors() {
    let mut server = Server::new_async().await;
    let ok = server
        .mock("GET", "/search.json")
        .match_query(Matcher::UrlEncoded("q".into(), "rust".into()))
        .with_status(200)
        .with_body(json!({ "organic_results": [{ "snippet": "A language" }] }).to_string())
        .create_async()
        .await;

    let tool = SerpApiTool::new("k").with_base_url(server.url());
    assert_eq!(tool.call("rust").await.unwrap(), "A language");
    ok.assert_async().await;

    let _fail = server
        .mock("GET", "/search.json")
        .match_query(Matcher::UrlEncoded("q".into(), "down".into()))
        .with_status(500)
        .create_async()
        .await;
    assert!(matches!(
        tool.call("down").await,
        Err(AiError::ToolExecutionError { .. })
    ));
}
