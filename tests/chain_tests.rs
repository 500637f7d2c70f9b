mod common;

use chain_samples::{
    callbacks::{CallbackManager, DebugCallbackHandler},
    chains::{load_summarization_chain, Chain, ConversationChain, LlmChain},
    document_loaders::Document,
    llms::{ChatOpenAI, OpenAI},
    memory::BufferWindowMemory,
    prompts::{ChatPromptTemplate, MessagePromptTemplate, PromptTemplate},
    schema::chain_values,
    AiError,
};
use common::{text_response, ScriptedProvider, SharedBuffer};
use serde_json::json;

#[tokio::test]
async fn test_llm_chain_formats_and_traces() {
    let provider = ScriptedProvider::new().reply(text_response("Socktastic")).shared();
    let buffer = SharedBuffer::new();
    let callbacks =
        CallbackManager::from_handler(DebugCallbackHandler::with_writer(buffer.clone()).shared());

    let prompt = PromptTemplate::new("What is a good name for a company that makes {product}?")
        .unwrap();
    let chain = LlmChain::new(
        prompt,
        OpenAI::from_provider(provider.clone()).callbacks(callbacks.clone()),
    )
    .with_callbacks(callbacks);

    let outputs = chain
        .call(chain_values([("product", "colorful socks")]))
        .await
        .unwrap();
    assert_eq!(outputs["text"], json!("Socktastic"));

    let sent = provider.requests()[0].messages[0].content.clone().unwrap();
    assert_eq!(sent, "What is a good name for a company that makes colorful socks?");

    let out = buffer.contents();
    let chain_start = out.find("[chain/start]").unwrap();
    let llm_start = out.find("[llm/start]").unwrap();
    let llm_end = out.find("[llm/end]").unwrap();
    let chain_end = out.find("[chain/end]").unwrap();
    assert!(chain_start < llm_start && llm_start < llm_end && llm_end < chain_end);
}

#[tokio::test]
async fn test_missing_input_is_rejected_before_the_model() {
    let provider = ScriptedProvider::new().shared();
    let chain = LlmChain::new(
        PromptTemplate::new("{a} and {b}").unwrap(),
        OpenAI::from_provider(provider.clone()),
    );

    let err = chain.call(chain_values([("a", "x")])).await.unwrap_err();
    assert!(matches!(err, AiError::InvalidRequest { field: Some(f), .. } if f == "b"));
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_chain_error_is_returned_when_debug_hook_fails() {
    let provider = ScriptedProvider::new()
        .fail(AiError::ServiceUnavailable {
            provider: "scripted".to_string(),
            retry_after: None,
        })
        .shared();
    let callbacks =
        CallbackManager::from_handler(DebugCallbackHandler::with_writer(SharedBuffer::new()).shared());
    let chain = LlmChain::new(
        PromptTemplate::new("{q}").unwrap(),
        OpenAI::from_provider(provider),
    )
    .with_callbacks(callbacks);

    let err = chain.run("anything").await.unwrap_err();
    assert!(matches!(err, AiError::ServiceUnavailable { .. }));
}

#[tokio::test]
async fn test_run_needs_single_input() {
    let chain = LlmChain::new(
        PromptTemplate::new("{a} {b}").unwrap(),
        OpenAI::from_provider(ScriptedProvider::new().shared()),
    );
    assert!(matches!(
        chain.run("x").await,
        Err(AiError::InvalidRequest { .. })
    ));
}

#[tokio::test]
async fn test_chat_prompt_through_chain() {
    let provider = ScriptedProvider::new().reply(text_response("Bonjour")).shared();
    let prompt = ChatPromptTemplate::from_messages(vec![
        MessagePromptTemplate::system("Translate to {language}.").unwrap(),
        MessagePromptTemplate::human("{text}").unwrap(),
    ]);
    let chain = LlmChain::new(prompt, ChatOpenAI::from_provider(provider.clone()));

    let text = chain
        .predict(chain_values([("language", "French"), ("text", "Hello")]))
        .await
        .unwrap();
    assert_eq!(text, "Bonjour");

    let request = &provider.requests()[0];
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].as_text(), Some("Translate to French."));
}

#[tokio::test]
async fn test_conversation_chain_remembers() {
    let provider = ScriptedProvider::new()
        .reply(text_response("Hi Jim!"))
        .reply(text_response("Your name is Jim."))
        .shared();
    let chain = ConversationChain::new(OpenAI::from_provider(provider.clone())).unwrap();

    assert_eq!(chain.input_keys(), vec!["input"]);
    assert_eq!(chain.output_keys(), vec!["response"]);

    let first = chain.call(chain_values([("input", "Hi! I'm Jim.")])).await.unwrap();
    assert_eq!(first["response"], json!("Hi Jim!"));

    let second = chain.run("What's my name?").await.unwrap();
    assert_eq!(second, "Your name is Jim.");

    let prompt = provider.requests()[1].messages[0].content.clone().unwrap();
    assert!(prompt.contains("Current conversation:\nHuman: Hi! I'm Jim.\nAI: Hi Jim!\nHuman: What's my name?\nAI:"));
}

#[tokio::test]
async fn test_conversation_chain_with_window_memory() {
    let provider = ScriptedProvider::new()
        .reply(text_response("1"))
        .reply(text_response("2"))
        .reply(text_response("3"))
        .shared();
    let chain =
        ConversationChain::with_memory(OpenAI::from_provider(provider.clone()), BufferWindowMemory::new(1))
            .unwrap();

    for input in ["first", "second", "third"] {
        chain.run(input).await.unwrap();
    }

    let prompt = provider.requests()[2].messages[0].content.clone().unwrap();
    assert!(!prompt.contains("Human: first"));
    assert!(prompt.contains("Human: second\nAI: 2\nHuman: third"));
}

#[tokio::test]
async fn test_summarization_stuffs_documents() {
    let provider = ScriptedProvider::new().reply(text_response("Short.")).shared();
    let chain = load_summarization_chain(OpenAI::from_provider(provider.clone())).unwrap();

    let docs = vec![Document::new("First part."), Document::new("Second part.")];
    let outputs = chain.call(chain.document_inputs(&docs).unwrap()).await.unwrap();
    assert_eq!(outputs["text"], json!("Short."));

    let prompt = provider.requests()[0].messages[0].content.clone().unwrap();
    assert!(prompt.starts_with("Write a concise summary of the following:"));
    assert!(prompt.contains("\"First part.\n\nSecond part.\""));
    assert!(prompt.ends_with("CONCISE SUMMARY:"));
}

#[tokio::test]
async fn test_stuff_chain_rejects_non_documents() {
    let chain = load_summarization_chain(OpenAI::from_provider(ScriptedProvider::new().shared()))
        .unwrap();
    let err = chain
        .call(chain_values([("input_documents", "not a list")]))
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::InvalidRequest { .. }));
}
