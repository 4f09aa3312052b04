//! A tool to generate, sign, validate, and diff curated package collections.
//!
//! # Overview
//!
//! `collection-gen` builds "package collection" documents: JSON manifests describing a curated
//! list of package repositories, each annotated with per-version metadata (targets, products,
//! tool versions, platform requirements, license, README). The generator clones or updates each
//! repository, inspects the manifest of every selected version, and supplements the result with
//! metadata fetched from the repository's hosting service (GitHub or GitLab style APIs).
//!
//! # Commands
//!
//! **Generate a collection:**
//! ```bash
//! collection-gen generate input.json collection.json \
//!     --working-directory-path ~/.cache/collections \
//!     --auth-token github:github.com:ghp_xxxx \
//!     --revision 3 --pretty-printed
//! ```
//!
//! **Sign a collection:**
//! ```bash
//! collection-gen sign collection.json signed.json private-key.pem cert.cer root.cer
//! ```
//!
//! **Validate a collection:**
//! ```bash
//! collection-gen validate collection.json --warnings-as-errors
//! ```
//!
//! **Compare two collections:**
//! ```bash
//! collection-gen diff collection-one.json collection-two.json
//! ```
//!
//! # Behavior notes
//!
//! Generation is best-effort: a package or version that cannot be processed is logged and
//! dropped rather than failing the whole run. The run only fails when the resulting collection
//! would contain no packages at all. Hosting metadata is purely supplementary; packages resolve
//! from local repository state alone when the hosting API is unreachable or rate limited.

use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};
use collection_gen::Result;

mod commands;

use crate::commands::{DiffArgs, GenerateArgs, SignArgs, ValidateArgs, diff_collections, generate_collection, sign_collection, validate_collection};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "collection-gen", version, about)]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a package collection from the given list of packages
    Generate(Box<GenerateArgs>),
    /// Sign a package collection
    Sign(SignArgs),
    /// Validate a package collection document
    Validate(ValidateArgs),
    /// Compare two package collections to determine if they are the same or different
    Diff(DiffArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Generate(args) => generate_collection(&args).await,
        Command::Sign(args) => sign_collection(&args),
        Command::Validate(args) => validate_collection(&args),
        Command::Diff(args) => diff_collections(&args),
    }
}
