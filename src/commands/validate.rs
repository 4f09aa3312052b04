use crate::commands::common::{init_logging, load_json};
use camino::Utf8PathBuf;
use clap::Parser;
use collection_gen::Result;
use collection_gen::model::Collection;
use collection_gen::validation::{CollectionValidator, ValidationLevel};
use ohno::bail;
use owo_colors::OwoColorize;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// The path to the JSON document containing the package collection to be validated
    #[arg(value_name = "INPUT-PATH")]
    pub input_path: Utf8PathBuf,

    /// Warnings will fail validation in addition to errors
    #[arg(long)]
    pub warnings_as_errors: bool,

    /// Show extra logging for debugging purposes
    #[arg(long)]
    pub verbose: bool,
}

pub fn validate_collection(args: &ValidateArgs) -> Result<()> {
    init_logging(args.verbose);

    println!("{}", format!("Using input file located at {}", args.input_path).cyan());
    let collection: Collection = load_json(&args.input_path)?;

    let messages = CollectionValidator::new().validate(&collection);
    if messages.is_empty() {
        println!("{}", "The package collection is valid.".green());
        return Ok(());
    }

    let mut error_count = 0;
    for message in &messages {
        match message.level {
            ValidationLevel::Warning => println!("{}", format!("[Warning] {message}").yellow()),
            ValidationLevel::Error => {
                error_count += 1;
                println!("{}", format!("[Error] {message}").red());
            }
        }
    }

    let fatal_count = if args.warnings_as_errors { messages.len() } else { error_count };
    if fatal_count > 0 {
        bail!("collection validation failed with {fatal_count} error(s)");
    }

    Ok(())
}
