//! A chat model driven by a system + human chat prompt.

use chain_samples::{
    config::Settings,
    llms::ChatOpenAI,
    logging,
    prompts::{ChatPromptTemplate, MessagePromptTemplate},
    schema::chain_values,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    logging::init(&settings.log_level)?;

    let chat = ChatOpenAI::from_settings(&settings).temperature(0.0);

    let prompt = ChatPromptTemplate::from_messages(vec![
        MessagePromptTemplate::system(
            "You are a helpful assistant that translates {input_language} to {output_language}.",
        )?,
        MessagePromptTemplate::human("{text}")?,
    ]);

    let messages = prompt.format_messages(&chain_values([
        ("input_language", "English"),
        ("output_language", "French"),
        ("text", "I love programming."),
    ]))?;

    let reply = chat.call(&messages).await?;
    println!("{}", reply.content);

    Ok(())
}
