use crate::commands::common::{init_logging, load_json};
use camino::Utf8PathBuf;
use clap::Parser;
use collection_gen::Result;
use collection_gen::model::Collection;
use owo_colors::OwoColorize;

#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// The path to the JSON document containing package collection #1
    #[arg(value_name = "COLLECTION-ONE-PATH")]
    pub collection_one_path: Utf8PathBuf,

    /// The path to the JSON document containing package collection #2
    #[arg(value_name = "COLLECTION-TWO-PATH")]
    pub collection_two_path: Utf8PathBuf,

    /// Show extra logging for debugging purposes
    #[arg(long)]
    pub verbose: bool,
}

pub fn diff_collections(args: &DiffArgs) -> Result<()> {
    init_logging(args.verbose);

    println!(
        "{}",
        format!(
            "Comparing collections located at {} and {}",
            args.collection_one_path, args.collection_two_path
        )
        .cyan()
    );

    let one: Collection = load_json(&args.collection_one_path)?;
    let two: Collection = load_json(&args.collection_two_path)?;

    // Informational only: a content difference is an answer, not a failure.
    if one.same_content(&two) {
        println!("{}", "The package collections are the same.".green());
    } else {
        println!("{}", "The package collections are different.".red());
    }

    Ok(())
}
