use crate::metadata::http::ResilientClient;
use crate::metadata::{AuthTokenKind, AuthTokens, GitUrl, MetadataProvider, PackageBasicMetadata, ProviderError, check_response_status, header_i64};
use crate::model::License;
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

const LOG_TARGET: &str = "  metadata";

const RATE_LIMIT_HEADER: &str = "RateLimit-Limit";
const RATE_REMAINING_HEADER: &str = "RateLimit-Remaining";

/// Metadata provider for GitLab-style hosting APIs.
///
/// Unlike the GitHub API, a single project request carries the README and
/// license information inline, so there is no dependent fan-out here.
#[derive(Debug)]
pub struct GitLabProvider {
    client: ResilientClient,
    tokens: AuthTokens,
}

impl GitLabProvider {
    /// Create a provider using `tokens` for authorization.
    pub fn new(tokens: AuthTokens) -> crate::Result<Self> {
        Ok(Self {
            client: ResilientClient::new("collection-gen")?,
            tokens,
        })
    }

    /// The project API endpoint for a parsed git URL: the API lives under the
    /// same host behind an `api/v4` path prefix, with the project identified by
    /// its URL-encoded `owner/repo` path.
    fn api_url(git_url: &GitUrl) -> Result<Url, ProviderError> {
        let spelled = format!("https://{}/api/v4/projects/{}%2F{}", git_url.host(), git_url.owner(), git_url.repository());
        Url::parse(&spelled).map_err(|_| ProviderError::InvalidGitUrl(spelled))
    }

    fn authorization(&self, host: &str) -> Option<String> {
        self.tokens.get(&AuthTokenKind::GitLab(host.to_string())).map(|token| format!("Bearer {token}"))
    }
}

#[async_trait]
impl MetadataProvider for GitLabProvider {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    fn handles(&self, host: &str) -> bool {
        host == "gitlab.com" || host.starts_with("gitlab.")
    }

    async fn get(&self, url: &Url) -> Result<PackageBasicMetadata, ProviderError> {
        let git_url = GitUrl::parse(url.as_str())?;
        let metadata_url = Self::api_url(&git_url)?;
        let authorization = self.authorization(git_url.host());

        let response = self.client.get(&metadata_url, None, authorization.as_deref()).await?;

        let limit = header_i64(response.headers(), RATE_LIMIT_HEADER);
        let remaining = header_i64(response.headers(), RATE_REMAINING_HEADER);
        check_response_status(&metadata_url, response.status(), authorization.is_some(), limit, remaining)?;

        let project: ProjectResponse = response.json().await.map_err(|e| ProviderError::InvalidResponse {
            url: metadata_url.clone(),
            detail: format!("could not parse body: {e}"),
        })?;

        let license = match (project.license, project.license_url) {
            (
                Some(LicenseInfo {
                    name,
                    source_url: Some(source_url),
                }),
                _,
            ) => Some(License { name, url: source_url }),
            (_, Some(license_url)) => Some(License {
                name: None,
                url: license_url,
            }),
            _ => None,
        };

        Ok(PackageBasicMetadata {
            summary: project.description,
            keywords: project.topics,
            readme_url: project.readme_url,
            license,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    description: Option<String>,
    topics: Option<Vec<String>>,
    readme_url: Option<Url>,
    license_url: Option<Url>,
    license: Option<LicenseInfo>,
}

#[derive(Debug, Deserialize)]
struct LicenseInfo {
    name: Option<String>,
    source_url: Option<Url>,
}
