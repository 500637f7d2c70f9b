//! A prompt template and an LLM chain, traced by the debug handler.

use chain_samples::{
    callbacks::{CallbackManager, DebugCallbackHandler},
    chains::{Chain, LlmChain},
    config::Settings,
    llms::OpenAI,
    logging,
    prompts::PromptTemplate,
    schema::chain_values,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    logging::init(&settings.log_level)?;

    let callbacks = CallbackManager::from_handler(DebugCallbackHandler::new().shared());
    let model = OpenAI::from_settings(&settings)
        .temperature(0.9)
        .callbacks(callbacks.clone());

    let prompt = PromptTemplate::new("What is a good name for a company that makes {product}?")?;
    let chain = LlmChain::new(prompt, model).with_callbacks(callbacks);

    let res = chain
        .call(chain_values([("product", "colorful socks")]))
        .await?;
    println!("{}", serde_json::to_string_pretty(&res)?);

    Ok(())
}
