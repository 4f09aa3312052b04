use crate::metadata::http::ResilientClient;
use crate::metadata::{AuthTokenKind, AuthTokens, GitUrl, MetadataProvider, PackageBasicMetadata, ProviderError, check_response_status, header_i64};
use crate::model::License;
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

const LOG_TARGET: &str = "  metadata";

const RATE_LIMIT_HEADER: &str = "X-RateLimit-Limit";
const RATE_REMAINING_HEADER: &str = "X-RateLimit-Remaining";

/// Accept header for the repository endpoint; the `mercy-preview` media type
/// includes repository topics in the response.
const METADATA_ACCEPT: &str = "application/vnd.github.mercy-preview+json";
const DEPENDENT_ACCEPT: &str = "application/vnd.github.v3+json";

/// Metadata provider for GitHub-style hosting APIs.
///
/// One request against the repository endpoint; if (and only if) it succeeds,
/// the README and license endpoints are queried in parallel. Failures of the
/// dependent requests degrade to `None` fields rather than failing the fetch.
#[derive(Debug)]
pub struct GitHubProvider {
    client: ResilientClient,
    tokens: AuthTokens,
}

impl GitHubProvider {
    /// Create a provider using `tokens` for authorization.
    pub fn new(tokens: AuthTokens) -> crate::Result<Self> {
        Ok(Self {
            client: ResilientClient::new("collection-gen")?,
            tokens,
        })
    }

    /// The repository-metadata API endpoint for a parsed git URL.
    fn api_url(git_url: &GitUrl) -> Result<Url, ProviderError> {
        let spelled = format!("https://api.{}/repos/{}/{}", git_url.host(), git_url.owner(), git_url.repository());
        Url::parse(&spelled).map_err(|_| ProviderError::InvalidGitUrl(spelled))
    }

    fn authorization(&self, host: &str) -> Option<String> {
        self.tokens.get(&AuthTokenKind::GitHub(host.to_string())).map(|token| format!("token {token}"))
    }

    /// Fetch and parse one dependent endpoint, tolerating every failure.
    async fn get_dependent<T>(&self, url: &Url, authorization: Option<&str>) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = match self.client.get(url, Some(DEPENDENT_ACCEPT), authorization).await {
            Ok(response) => response,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Dependent request to '{url}' failed: {e}");
                return None;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            log::debug!(target: LOG_TARGET, "Dependent request to '{url}' returned status {}", response.status());
            return None;
        }

        match response.json::<T>().await {
            Ok(body) => Some(body),
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Could not parse response from '{url}': {e}");
                None
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for GitHubProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn handles(&self, _host: &str) -> bool {
        // Default provider: GitHub-style APIs are assumed for any host that no
        // earlier registry entry claimed.
        true
    }

    async fn get(&self, url: &Url) -> Result<PackageBasicMetadata, ProviderError> {
        let git_url = GitUrl::parse(url.as_str())?;
        let metadata_url = Self::api_url(&git_url)?;
        let authorization = self.authorization(git_url.host());

        let response = self.client.get(&metadata_url, Some(METADATA_ACCEPT), authorization.as_deref()).await?;

        let limit = header_i64(response.headers(), RATE_LIMIT_HEADER);
        let remaining = header_i64(response.headers(), RATE_REMAINING_HEADER);
        check_response_status(&metadata_url, response.status(), authorization.is_some(), limit, remaining)?;

        let repository: RepositoryResponse = response.json().await.map_err(|e| ProviderError::InvalidResponse {
            url: metadata_url.clone(),
            detail: format!("could not parse body: {e}"),
        })?;

        // The main request succeeded; fan out the dependent requests. Their
        // failures are tolerated and simply leave the fields empty.
        let readme_url = Url::parse(&format!("{metadata_url}/readme")).ok();
        let license_url = Url::parse(&format!("{metadata_url}/license")).ok();

        let (readme, license) = tokio::join!(
            async {
                match &readme_url {
                    Some(u) => self.get_dependent::<ReadmeResponse>(u, authorization.as_deref()).await,
                    None => None,
                }
            },
            async {
                match &license_url {
                    Some(u) => self.get_dependent::<LicenseResponse>(u, authorization.as_deref()).await,
                    None => None,
                }
            },
        );

        Ok(PackageBasicMetadata {
            summary: repository.description,
            keywords: repository.topics,
            readme_url: readme.and_then(|r| r.download_url),
            license: license.and_then(|l| {
                l.download_url.map(|url| License {
                    name: l.license.and_then(|info| info.spdx_id),
                    url,
                })
            }),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    description: Option<String>,
    topics: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ReadmeResponse {
    download_url: Option<Url>,
}

#[derive(Debug, Deserialize)]
struct LicenseResponse {
    download_url: Option<Url>,
    license: Option<LicenseInfo>,
}

#[derive(Debug, Deserialize)]
struct LicenseInfo {
    spdx_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_derivation() {
        let git_url = GitUrl::parse("https://github.com/octo/widget.git").expect("parseable");
        let api = GitHubProvider::api_url(&git_url).expect("derivable");
        assert_eq!(api.as_str(), "https://api.github.com/repos/octo/widget");
    }

    #[test]
    fn test_repository_response_parsing() {
        let body = r#"{
            "name": "widget",
            "full_name": "octo/widget",
            "description": "A widget library",
            "topics": ["widgets", "ui"]
        }"#;

        let parsed: RepositoryResponse = serde_json::from_str(body).expect("parseable");
        assert_eq!(parsed.description.as_deref(), Some("A widget library"));
        assert_eq!(parsed.topics.as_deref().map(<[String]>::len), Some(2));
    }
}
