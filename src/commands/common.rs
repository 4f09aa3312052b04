//! Shared helpers for the CLI commands.

use camino::Utf8Path;
use collection_gen::Result;
use collection_gen::metadata::{AuthTokenKind, AuthTokens};
use ohno::IntoAppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

const LOG_TARGET: &str = "  commands";

/// Configure logging for the process. `--verbose` raises the filter so the
/// pipeline's per-step diagnostics become visible.
pub fn init_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
    env_logger::Builder::new().filter_level(level).init();
}

/// Parse `type:host:token` auth token arguments.
///
/// Malformed entries are skipped with a warning rather than failing the run.
/// Token values never appear in logs.
pub fn parse_auth_tokens(specs: &[String]) -> AuthTokens {
    let mut tokens = AuthTokens::new();

    for spec in specs {
        let mut parts = spec.splitn(3, ':');
        let (kind, host, token) = match (parts.next(), parts.next(), parts.next()) {
            (Some(kind), Some(host), Some(token)) if !host.is_empty() && !token.is_empty() => (kind, host, token),
            _ => {
                log::warn!(target: LOG_TARGET, "Ignoring malformed auth token argument (expected type:host:token)");
                continue;
            }
        };

        match AuthTokenKind::from_type(kind, host) {
            Some(key) => {
                let _ = tokens.insert(key, token.to_string());
            }
            None => {
                log::warn!(target: LOG_TARGET, "Ignoring auth token with unknown type '{kind}' for host '{host}'");
            }
        }
    }

    tokens
}

/// Load and parse a JSON document.
pub fn load_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T> {
    let file = File::open(path.as_std_path()).into_app_err_with(|| format!("unable to open file '{path}'"))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).into_app_err_with(|| format!("unable to parse file '{path}'"))
}

/// Write a JSON document, creating parent directories as needed.
///
/// The document is serialized through a generic value first so object keys are
/// emitted in sorted order, keeping the output stable across runs.
pub fn write_json_doc<T: Serialize>(path: &Utf8Path, document: &T, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent.as_std_path()).into_app_err_with(|| format!("unable to create directory '{parent}'"))?;
    }

    let value = serde_json::to_value(document).into_app_err("unable to serialize document")?;

    let file = File::create(path.as_std_path()).into_app_err_with(|| format!("unable to create file '{path}'"))?;
    let mut writer = BufWriter::new(file);

    let result = if pretty {
        serde_json::to_writer_pretty(&mut writer, &value)
    } else {
        serde_json::to_writer(&mut writer, &value)
    };

    result.into_app_err_with(|| format!("unable to write file '{path}'"))?;
    writer.flush().into_app_err_with(|| format!("unable to flush file '{path}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_auth_tokens() {
        let tokens = parse_auth_tokens(&specs(&[
            "github:github.com:ghp_secret",
            "gitlab:gitlab.example.com:glpat_secret",
        ]));

        assert_eq!(tokens.len(), 2);
        assert_eq!(
            tokens.get(&AuthTokenKind::GitHub("github.com".to_string())).map(String::as_str),
            Some("ghp_secret")
        );
        assert_eq!(
            tokens.get(&AuthTokenKind::GitLab("gitlab.example.com".to_string())).map(String::as_str),
            Some("glpat_secret")
        );
    }

    #[test]
    fn test_malformed_auth_tokens_are_skipped() {
        let tokens = parse_auth_tokens(&specs(&["github", "github:github.com", "bitbucket:bitbucket.org:token", "github::token", ""]));
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_token_value_may_contain_colons() {
        let tokens = parse_auth_tokens(&specs(&["github:github.com:to:ken"]));
        assert_eq!(
            tokens.get(&AuthTokenKind::GitHub("github.com".to_string())).map(String::as_str),
            Some("to:ken")
        );
    }
}
