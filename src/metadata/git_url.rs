use crate::metadata::ProviderError;
use core::fmt::{Display, Formatter};
use regex::Regex;
use std::sync::LazyLock;

/// One tolerant pattern covering the common git URL spellings:
/// `https://host/owner/repo(.git)`, `ssh://git@host/owner/repo(.git)`,
/// and scp-style `git@host:owner/repo(.git)`, each with an optional
/// trailing slash.
static GIT_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:https?|ssh)://)?(?:[\w.-]+@)?([\w.-]+)[:/]([\w.-]+)/([\w.-]+?)(?:\.git)?/?$").expect("invalid regex")
});

/// The `{host, owner, repository}` triple extracted from a git repository URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitUrl {
    host: Box<str>,
    owner: Box<str>,
    repository: Box<str>,
}

impl GitUrl {
    /// Parse a git repository URL.
    ///
    /// Fails with [`ProviderError::InvalidGitUrl`] before any network or
    /// filesystem activity when the URL does not look like a git repository.
    pub fn parse(url: &str) -> Result<Self, ProviderError> {
        let captures = GIT_URL_REGEX.captures(url).ok_or_else(|| ProviderError::InvalidGitUrl(url.to_string()))?;

        let host = &captures[1];
        let owner = &captures[2];
        let repository = &captures[3];

        if host.is_empty() || owner.is_empty() || repository.is_empty() {
            return Err(ProviderError::InvalidGitUrl(url.to_string()));
        }

        Ok(Self {
            host: Box::from(host),
            owner: Box::from(owner),
            repository: Box::from(repository),
        })
    }

    /// The repository's host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The repository's owner (user or organization).
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The repository name, with any trailing `.git` stripped.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }
}

impl Display for GitUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.owner, self.repository)
    }
}
