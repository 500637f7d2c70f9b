//! Ask for a structured answer and parse it.

use chain_samples::{
    config::Settings,
    llms::OpenAI,
    logging,
    output_parsers::{OutputParser, StructuredOutputParser},
    prompts::PromptTemplate,
    schema::chain_values,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    logging::init(&settings.log_level)?;

    let parser = StructuredOutputParser::from_names_and_descriptions([
        ("answer", "answer to the user's question"),
        ("source", "source used to answer the user's question, should be a website."),
    ]);

    let prompt = PromptTemplate::new(
        "Answer the users question as best as possible.\n{format_instructions}\n{question}",
    )?
    .partial("format_instructions", parser.format_instructions());

    let input = prompt.format(&chain_values([("question", "What is the capital of France?")]))?;
    println!("{}", input);

    let model = OpenAI::from_settings(&settings).temperature(0.0);
    let response = model.call(&input).await?;
    println!("{}", response);

    let parsed = parser.parse(&response)?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);

    Ok(())
}
