//! Version control operations needed by the generation pipeline.
//!
//! The pipeline only ever needs five operations: clone, fetch, checkout, tag
//! listing, and tag annotation lookup. They are kept behind the
//! [`VersionControlProvider`] trait so the pipeline can be driven by stub
//! repositories in tests.

mod git_cli;

pub use git_cli::GitCli;

use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use url::Url;

/// Metadata carried by an annotated tag. Both fields are absent for
/// lightweight tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagAnnotation {
    /// The tag's annotation message.
    pub message: Option<String>,

    /// When the tag was created.
    pub created_at: Option<DateTime<Utc>>,
}

/// The version control operations the generation pipeline depends on.
#[async_trait]
pub trait VersionControlProvider: Send + Sync {
    /// Clone the repository at `url` into `path`.
    async fn clone_repo(&self, url: &Url, path: &Path) -> Result<()>;

    /// Fetch updates into the previously-cloned repository at `path`.
    async fn fetch(&self, path: &Path) -> Result<()>;

    /// Check out `reference` (a tag or branch name) in the repository at `path`.
    async fn checkout(&self, path: &Path, reference: &str) -> Result<()>;

    /// List all tag names in the repository at `path`.
    async fn list_tags(&self, path: &Path) -> Result<Vec<String>>;

    /// Look up the annotation metadata of `tag`.
    async fn tag_annotation(&self, path: &Path, tag: &str) -> Result<TagAnnotation>;
}
