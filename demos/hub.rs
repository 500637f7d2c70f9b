//! Load a prompt from the LangChain hub and run it.
//!
//! Failures are logged and the sample exits cleanly.

use chain_samples::{
    chains::LlmChain,
    config::Settings,
    hub::HubClient,
    llms::OpenAI,
    logging,
    prompts::BasePromptTemplate,
    schema::ChainValues,
};
use serde_json::Value;
use tracing::error;

const PROMPT_URI: &str = "lc://prompts/hello-world/prompt.yaml";

async fn run(settings: &Settings) -> chain_samples::Result<String> {
    let prompt = HubClient::from_settings(settings).load_prompt(PROMPT_URI).await?;

    let inputs: ChainValues = prompt
        .input_variables()
        .into_iter()
        .map(|name| (name, Value::String("hi".to_string())))
        .collect();

    let chain = LlmChain::new(prompt, OpenAI::from_settings(settings).temperature(0.9));
    chain.predict(inputs).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    logging::init(&settings.log_level)?;

    match run(&settings).await {
        Ok(res) => println!("{}", res),
        Err(err) => error!(uri = PROMPT_URI, error = %err, "hub sample failed"),
    }

    Ok(())
}
