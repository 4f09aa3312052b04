use crate::commands::common::{init_logging, load_json, write_json_doc};
use camino::Utf8PathBuf;
use clap::Parser;
use collection_gen::Result;
use collection_gen::model::Collection;
use collection_gen::signing::{CollectionSigner, JwsSigner};
use ohno::bail;
use owo_colors::OwoColorize;

#[derive(Parser, Debug)]
pub struct SignArgs {
    /// The path to the package collection file to be signed
    #[arg(value_name = "INPUT-PATH")]
    pub input_path: Utf8PathBuf,

    /// The path to write the signed package collection to
    #[arg(value_name = "OUTPUT-PATH")]
    pub output_path: Utf8PathBuf,

    /// The path to the certificate's private key (PEM encoded)
    #[arg(value_name = "PRIVATE-KEY-PATH")]
    pub private_key_path: Utf8PathBuf,

    /// Paths to all certificates in the chain. The certificate used for signing
    /// must be first and the root certificate last.
    #[arg(value_name = "CERT-CHAIN-PATHS")]
    pub cert_chain_paths: Vec<Utf8PathBuf>,

    /// Show extra logging for debugging purposes
    #[arg(long)]
    pub verbose: bool,
}

pub fn sign_collection(args: &SignArgs) -> Result<()> {
    init_logging(args.verbose);

    if args.cert_chain_paths.is_empty() {
        eprintln!("{}", "Certificate chain cannot be empty".red());
        bail!("certificate chain cannot be empty");
    }

    println!("{}", format!("Signing package collection located at {}", args.input_path).cyan());
    let collection: Collection = load_json(&args.input_path)?;

    let signer = JwsSigner::from_paths(&args.private_key_path, &args.cert_chain_paths)?;
    let signed = signer.sign(&collection)?;

    write_json_doc(&args.output_path, &signed, false)?;
    println!("{}", format!("Signed package collection saved to {}", args.output_path).cyan());

    Ok(())
}
