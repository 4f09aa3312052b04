//! Supplementary package metadata fetched from repository hosting services.
//!
//! Hosting APIs contribute the package summary, keywords, README URL, and
//! license that cannot be derived from the repository contents alone. Each
//! supported service gets its own [`MetadataProvider`] implementation;
//! selection is table-driven on the host of the package's git URL via
//! [`ProviderRegistry`].
//!
//! Everything here is best-effort from the pipeline's point of view: a
//! provider failure of any kind degrades to "no supplementary metadata" at
//! the aggregation layer and never fails a package.

mod git_url;
mod github;
mod gitlab;
mod http;

pub use git_url::GitUrl;
pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;
pub use http::ResilientClient;

use crate::Result;
use crate::model::License;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Basic descriptive metadata for one package, as reported by its hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageBasicMetadata {
    /// Repository description.
    pub summary: Option<String>,

    /// Repository topics.
    pub keywords: Option<Vec<String>>,

    /// Direct download URL of the repository's README.
    pub readme_url: Option<Url>,

    /// The repository's license.
    pub license: Option<License>,
}

/// Failure modes of a metadata fetch.
///
/// All of these are tolerated at the aggregation layer; the typed variants exist
/// so callers can log precisely and tests can assert on outcomes.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The package URL could not be parsed as a git repository URL.
    #[error("invalid git repository URL '{0}'")]
    InvalidGitUrl(String),

    /// The service responded in an unexpected way.
    #[error("invalid response from '{url}': {detail}")]
    InvalidResponse {
        /// The request URL.
        url: Url,
        /// What was wrong with the response.
        detail: String,
    },

    /// The service refused the request.
    #[error("permission denied for '{0}'")]
    PermissionDenied(Url),

    /// The service rejected the supplied authentication token.
    #[error("invalid or expired authentication token for '{0}'")]
    InvalidAuthToken(Url),

    /// The service's rate limit has been exhausted.
    #[error("API rate limit exceeded for '{url}' (limit {limit}, remaining {remaining})")]
    RateLimitExceeded {
        /// The request URL.
        url: Url,
        /// The advertised request quota.
        limit: i64,
        /// The advertised remaining quota.
        remaining: i64,
    },

    /// The repository does not exist (or is not visible to this caller).
    #[error("repository not found at '{0}'")]
    NotFound(Url),

    /// Too many recent errors from this host; the request was shed without
    /// touching the network.
    #[error("circuit breaker open for host '{0}'")]
    CircuitBreakerOpen(String),

    /// The request failed at the transport level after retries.
    #[error("request to '{url}' failed: {source}")]
    Transport {
        /// The request URL.
        url: Url,
        /// The underlying transport error.
        source: reqwest::Error,
    },
}

/// Fetches [`PackageBasicMetadata`] for a package from its hosting service.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Whether this provider serves repositories on `host`.
    fn handles(&self, host: &str) -> bool;

    /// Fetch metadata for the package at `url`.
    async fn get(&self, url: &Url) -> Result<PackageBasicMetadata, ProviderError>;
}

/// Kind and host of an API authentication token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthTokenKind {
    /// GitHub-style token for the given host.
    GitHub(String),

    /// GitLab-style token for the given host.
    GitLab(String),
}

impl AuthTokenKind {
    /// Build a token kind from its wire spelling (`github` / `gitlab`) and host.
    #[must_use]
    pub fn from_type(kind: &str, host: &str) -> Option<Self> {
        match kind {
            "github" => Some(Self::GitHub(host.to_string())),
            "gitlab" => Some(Self::GitLab(host.to_string())),
            _ => None,
        }
    }
}

/// Authentication tokens keyed by kind and host.
pub type AuthTokens = HashMap<AuthTokenKind, String>;

/// Host-based provider lookup table.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn MetadataProvider>>,
}

impl core::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProviderRegistry").field("providers", &self.providers.len()).finish()
    }
}

impl ProviderRegistry {
    /// Create the default registry with GitHub and GitLab providers sharing `tokens`.
    pub fn new(tokens: AuthTokens) -> Result<Self> {
        Ok(Self {
            providers: vec![
                Box::new(GitLabProvider::new(tokens.clone())?),
                Box::new(GitHubProvider::new(tokens)?),
            ],
        })
    }

    /// Create a registry from explicit providers. Lookup checks them in order.
    #[must_use]
    pub fn with_providers(providers: Vec<Box<dyn MetadataProvider>>) -> Self {
        Self { providers }
    }

    /// Find the provider responsible for `host`.
    #[must_use]
    pub fn lookup(&self, host: &str) -> Option<&dyn MetadataProvider> {
        self.providers.iter().find(|p| p.handles(host)).map(AsRef::as_ref)
    }
}

/// Map a response's status code and rate-limit headers to an outcome.
///
/// The precedence is fixed: an exhausted rate limit wins over any status code,
/// then auth failures, then not-found, then success. Anything else is an
/// invalid response.
pub(crate) fn check_response_status(
    url: &Url,
    status: StatusCode,
    has_authorization: bool,
    limit: Option<i64>,
    remaining: Option<i64>,
) -> Result<(), ProviderError> {
    if remaining == Some(0) {
        return Err(ProviderError::RateLimitExceeded {
            url: url.clone(),
            limit: limit.unwrap_or(-1),
            remaining: 0,
        });
    }

    match status.as_u16() {
        401 if has_authorization => Err(ProviderError::InvalidAuthToken(url.clone())),
        401 => Err(ProviderError::PermissionDenied(url.clone())),
        403 => Err(ProviderError::PermissionDenied(url.clone())),
        404 => Err(ProviderError::NotFound(url.clone())),
        200 => Ok(()),
        other => Err(ProviderError::InvalidResponse {
            url: url.clone(),
            detail: format!("unexpected status code {other}"),
        }),
    }
}

/// Read an integer response header, if present and well-formed.
pub(crate) fn header_i64(headers: &reqwest::header::HeaderMap, name: &str) -> Option<i64> {
    headers.get(name).and_then(|v| v.to_str().ok()).and_then(|v| v.parse().ok())
}
