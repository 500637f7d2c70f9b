//! A function-calling agent with a calculator and web search.
//!
//! The debug handler is attached to the model only, so the trace shows each
//! model round trip but not the agent's own events.

use chain_samples::{
    agents::{AgentExecutor, CalculatorTool, SerpApiTool, ToolRegistry},
    callbacks::{CallbackManager, DebugCallbackHandler},
    chains::Chain,
    config::Settings,
    llms::ChatOpenAI,
    logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    logging::init(&settings.log_level)?;

    let model = ChatOpenAI::from_settings(&settings)
        .temperature(0.0)
        .callbacks(CallbackManager::from_handler(DebugCallbackHandler::new().shared()));

    let tools = ToolRegistry::new()
        .with(SerpApiTool::from_settings(&settings)?)
        .with(CalculatorTool);

    let executor = AgentExecutor::new(model, tools);

    let input = "Who is Olivia Wilde's boyfriend? What is his current age raised to the 0.23 power?";
    println!("Executing with input \"{}\"...", input);

    let output = executor.run(input).await?;
    println!("Got output {}", output);

    Ok(())
}
