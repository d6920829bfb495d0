mod cli;
mod error;
mod legacy;
mod vocabulary;

use clap::Parser;
use log::{error, info};
use vx_mapping::{edm_schema, InputSchema, OutputSchema};

use error::CompilerError;
use legacy::LegacyVocabulary;
use vocabulary::Vocabulary;

fn read_input(input: &str) -> Result<String, CompilerError> {
    if input.starts_with("http://") || input.starts_with("https://") {
        info!("fetching {input}");
        Ok(reqwest::blocking::get(input)?.error_for_status()?.text()?)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

fn run(cli: cli::Cli) -> Result<(), CompilerError> {
    let input_schema = InputSchema::rdf();
    let output_schema = edm_schema()?;
    let options = cli.compile_options(output_schema.namespaces())?;

    let legacy = LegacyVocabulary::parse(&read_input(&cli.input)?)?;
    let vocabulary = Vocabulary::compile(legacy, &input_schema, &output_schema, &options)?;
    info!(
        "{} vocabulary {:?} at {}*{}: {} url rules, {} type rules",
        vocabulary.vocabulary_type,
        vocabulary.name,
        vocabulary.uri.as_deref().unwrap_or("<no uri>"),
        vocabulary.suffix.as_deref().unwrap_or(""),
        vocabulary.url_rules.len(),
        vocabulary.type_rules.len()
    );

    match cli.output {
        Some(path) => std::fs::write(path, &vocabulary.xslt)?,
        None => print!("{}", vocabulary.xslt),
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = cli::Cli::parse();

    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}
