//! A two-turn conversation that remembers the first turn.

use chain_samples::{
    chains::{Chain, ConversationChain},
    config::Settings,
    llms::OpenAI,
    logging,
    schema::chain_values,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    logging::init(&settings.log_level)?;

    let chain = ConversationChain::new(OpenAI::from_settings(&settings).temperature(0.0))?;

    let res1 = chain.call(chain_values([("input", "Hi! I'm Jim.")])).await?;
    println!("{}", serde_json::to_string_pretty(&res1)?);

    let res2 = chain.call(chain_values([("input", "What's my name?")])).await?;
    println!("{}", serde_json::to_string_pretty(&res2)?);

    Ok(())
}
