use crate::commands::common::{init_logging, load_json, parse_auth_tokens, write_json_doc};
use camino::Utf8PathBuf;
use clap::Parser;
use collection_gen::Result;
use collection_gen::generate::{CollectionAssembler, PackageAggregator};
use collection_gen::inspect::DumpToolInspector;
use collection_gen::metadata::ProviderRegistry;
use collection_gen::model::CollectionInput;
use collection_gen::vcs::GitCli;
use ohno::IntoAppError;
use owo_colors::OwoColorize;
use std::fs;
use std::path::Path;

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// The path to the JSON document containing the list of packages to be processed
    #[arg(value_name = "INPUT-PATH")]
    pub input_path: Utf8PathBuf,

    /// The path to write the generated package collection to
    #[arg(value_name = "OUTPUT-PATH")]
    pub output_path: Utf8PathBuf,

    /// The path to the working directory where package repositories may have been cloned previously.
    /// A repository that already exists there is updated rather than cloned again. Be warned that
    /// working copies are keyed by repository name only; different repositories with the same name
    /// end up in the same directory. A temporary directory is used when this is not specified.
    #[arg(long, value_name = "PATH")]
    pub working_directory_path: Option<Utf8PathBuf>,

    /// The revision number of the generated package collection
    #[arg(long, value_name = "N")]
    pub revision: Option<i64>,

    /// API authentication token in type:host:token format; may be repeated
    #[arg(long = "auth-token", value_name = "TYPE:HOST:TOKEN")]
    pub auth_tokens: Vec<String>,

    /// Pretty-print the generated JSON document
    #[arg(long)]
    pub pretty_printed: bool,

    /// Show extra logging for debugging purposes
    #[arg(long)]
    pub verbose: bool,
}

pub async fn generate_collection(args: &GenerateArgs) -> Result<()> {
    init_logging(args.verbose);

    println!("{}", format!("Using input file located at {}", args.input_path).cyan());
    let input: CollectionInput = load_json(&args.input_path)?;

    let registry = ProviderRegistry::new(parse_auth_tokens(&args.auth_tokens))?;
    let vcs = GitCli::new();
    let inspector = DumpToolInspector::default();

    // The temporary directory, when used, must outlive assembly.
    let temp_dir;
    let working_dir: &Path = match &args.working_directory_path {
        Some(path) => {
            fs::create_dir_all(path.as_std_path()).into_app_err_with(|| format!("unable to create working directory '{path}'"))?;
            path.as_std_path()
        }
        None => {
            temp_dir = tempfile::tempdir().into_app_err("unable to create a temporary working directory")?;
            temp_dir.path()
        }
    };

    let aggregator = PackageAggregator::new(&vcs, &inspector, &registry, working_dir);
    let assembler = CollectionAssembler::new(aggregator);
    let collection = assembler.assemble(&input, args.revision).await?;

    write_json_doc(&args.output_path, &collection, args.pretty_printed)?;
    println!("{}", format!("Package collection saved to {}", args.output_path).cyan());

    Ok(())
}
