//! Few-shot prompting with examples picked to fit a length budget.

use chain_samples::{
    config::Settings,
    llms::OpenAI,
    logging,
    prompts::{FewShotPromptTemplate, PromptTemplate},
    schema::chain_values,
    selectors::{Example, LengthBasedExampleSelector},
};

fn antonym(input: &str, output: &str) -> Example {
    Example::from([
        ("input".to_string(), input.to_string()),
        ("output".to_string(), output.to_string()),
    ])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    logging::init(&settings.log_level)?;

    let example_prompt = PromptTemplate::new("Input: {input}\nOutput: {output}")?;
    let selector = LengthBasedExampleSelector::from_examples(
        vec![
            antonym("happy", "sad"),
            antonym("tall", "short"),
            antonym("energetic", "lethargic"),
            antonym("sunny", "gloomy"),
            antonym("windy", "calm"),
        ],
        example_prompt.clone(),
    )?
    .max_length(25);

    let prompt = FewShotPromptTemplate::with_selector(
        selector,
        example_prompt,
        "Give the antonym of every input",
        "Input: {adjective}\nOutput:",
    )?;

    let short = prompt.format(&chain_values([("adjective", "big")]))?;
    println!("{}\n", short);

    let long = prompt.format(&chain_values([(
        "adjective",
        "big and huge and massive and large and gigantic and tall and much much much much much bigger than everything else",
    )]))?;
    println!("{}\n", long);

    let model = OpenAI::from_settings(&settings).temperature(0.0);
    println!("{}", model.call(&short).await?);

    Ok(())
}
