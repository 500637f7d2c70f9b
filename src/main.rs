use chain_samples::{config::Settings, llms::OpenAI, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    logging::init(&settings.log_level)?;

    let model = OpenAI::from_settings(&settings).temperature(0.9);
    let res = model.call("hello").await?;
    println!("{}", res);

    Ok(())
}
