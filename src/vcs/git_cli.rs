use crate::Result;
use crate::vcs::{TagAnnotation, VersionControlProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::{IntoAppError, bail};
use std::path::Path;
use tokio::process::Command;
use url::Url;

const LOG_TARGET: &str = "       git";

const GIT_TIMEOUT: Duration = Duration::from_secs(300);

/// [`VersionControlProvider`] backed by the `git` command-line tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitCli {
    /// Create a git provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn path_str(path: &Path) -> Result<&str> {
        path.to_str().into_app_err("invalid UTF-8 in repository path")
    }
}

#[async_trait]
impl VersionControlProvider for GitCli {
    async fn clone_repo(&self, url: &Url, path: &Path) -> Result<()> {
        log::info!(target: LOG_TARGET, "Cloning '{url}'");
        let output = run_git_with_timeout(&["clone", url.as_str(), Self::path_str(path)?]).await?;
        check_git_output(&output, "git clone")
    }

    async fn fetch(&self, path: &Path) -> Result<()> {
        log::info!(target: LOG_TARGET, "Fetching updates in '{}'", path.display());
        let output = run_git_with_timeout(&["-C", Self::path_str(path)?, "fetch", "--tags", "--force"]).await?;
        check_git_output(&output, "git fetch")
    }

    async fn checkout(&self, path: &Path, reference: &str) -> Result<()> {
        log::debug!(target: LOG_TARGET, "Checking out '{reference}' in '{}'", path.display());
        let output = run_git_with_timeout(&["-C", Self::path_str(path)?, "checkout", reference]).await?;
        check_git_output(&output, "git checkout")
    }

    async fn list_tags(&self, path: &Path) -> Result<Vec<String>> {
        let output = run_git_with_timeout(&["-C", Self::path_str(path)?, "tag"]).await?;
        check_git_output(&output, "git tag")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.split_whitespace().map(ToString::to_string).collect())
    }

    async fn tag_annotation(&self, path: &Path, tag: &str) -> Result<TagAnnotation> {
        // %0a is a literal newline in for-each-ref format strings; taggerdate and
        // contents are only populated for annotated tags.
        let format = "%(objecttype)%0a%(taggerdate:iso-strict)%0a%(contents:subject)";
        let reference = format!("refs/tags/{tag}");
        let output = run_git_with_timeout(&["-C", Self::path_str(path)?, "for-each-ref", &reference, "--format", format]).await?;
        check_git_output(&output, "git for-each-ref")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut lines = stdout.lines();

        if lines.next() != Some("tag") {
            // Lightweight tag: no annotation to report.
            return Ok(TagAnnotation::default());
        }

        let created_at = lines
            .next()
            .and_then(|line| DateTime::parse_from_rfc3339(line.trim()).ok())
            .map(|date| date.with_timezone(&Utc));

        let message = lines.next().map(str::trim).filter(|line| !line.is_empty()).map(ToString::to_string);

        Ok(TagAnnotation { message, created_at })
    }
}

fn check_git_output(output: &std::process::Output, operation: &str) -> Result<()> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{operation} failed: {}", stderr.trim());
    }
    Ok(())
}

async fn run_git_with_timeout(args: &[&str]) -> Result<std::process::Output> {
    let child = Command::new("git")
        .args(args)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .into_app_err("could not spawn git command")?;

    match tokio::time::timeout(GIT_TIMEOUT, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(e).into_app_err_with(|| format!("'git {}' failed to run", args.join(" "))),
        Err(_) => {
            bail!("'git {}' timed out after {} seconds", args.join(" "), GIT_TIMEOUT.as_secs());
        }
    }
}
