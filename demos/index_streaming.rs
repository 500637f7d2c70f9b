//! Stream a completion token by token through the debug handler.

use chain_samples::{
    callbacks::{CallbackManager, DebugCallbackHandler},
    config::Settings,
    llms::OpenAI,
    logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    logging::init(&settings.log_level)?;

    let callbacks = CallbackManager::from_handler(DebugCallbackHandler::new().shared());
    let model = OpenAI::from_settings(&settings)
        .temperature(0.9)
        .streaming(true)
        .callbacks(callbacks);

    let res = model.call("Write me a song about sparkling water.").await?;
    println!("\n{}", res);

    Ok(())
}
