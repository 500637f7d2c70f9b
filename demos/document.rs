//! Load a web page and summarize it with a stuff-documents chain.

use chain_samples::{
    chains::{load_summarization_chain, Chain},
    config::Settings,
    document_loaders::{DocumentLoader, WebPageLoader},
    llms::OpenAI,
    logging,
};

const PAGE: &str = "https://en.wikipedia.org/wiki/Large_language_model";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    logging::init(&settings.log_level)?;

    let docs = WebPageLoader::new(PAGE)?.load().await?;
    println!("Loaded {} document(s) from {}", docs.len(), PAGE);

    let model = OpenAI::from_settings(&settings).temperature(0.0).max_tokens(256);
    let chain = load_summarization_chain(model)?;

    let res = chain.call(chain.document_inputs(&docs)?).await?;
    println!("{}", serde_json::to_string_pretty(&res)?);

    Ok(())
}
