//! GitHub commit status publishing for Tollgate.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tollgate_core::{PullRequestRef, StatusReport, StatusService, StatusState};
use tracing::debug;
use url::Url;

const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "Tollgate-CI";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub API configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    /// API root, e.g. `https://api.github.com` or
    /// `https://ghe.example.com/api/v3`.
    pub api_url: Url,
}

impl GitHubConfig {
    pub fn new(token: impl Into<String>, api_url: &str) -> Result<Self, GitHubError> {
        let api_url = Url::parse(api_url)
            .map_err(|e| GitHubError::InvalidUrl(format!("{}: {}", api_url, e)))?;
        Ok(Self {
            token: token.into(),
            api_url,
        })
    }

    /// Read `GITHUB_TOKEN` and, optionally, `GITHUB_API_URL`.
    pub fn from_env() -> Result<Self, GitHubError> {
        let token = std::env::var("GITHUB_TOKEN").map_err(|_| GitHubError::MissingToken)?;
        let api_url =
            std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(token, &api_url)
    }

    /// Endpoint for statuses on `sha` in `owner/repo`.
    pub fn statuses_url(&self, owner: &str, repo: &str, sha: &str) -> String {
        format!(
            "{}/repos/{}/{}/statuses/{}",
            self.api_url.as_str().trim_end_matches('/'),
            owner,
            repo,
            sha
        )
    }
}

/// Request body of the create-commit-status endpoint.
#[derive(Debug, Serialize)]
struct CreateStatus<'a> {
    state: StatusState,
    context: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_url: Option<&'a str>,
}

/// GitHub API client for commit statuses.
pub struct GitHubStatusClient {
    client: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubStatusClient {
    pub fn new(config: GitHubConfig) -> Result<Self, GitHubError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GitHubError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Create a commit status on `sha`.
    pub async fn create_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        report: &StatusReport,
    ) -> Result<(), GitHubError> {
        let url = self.config.statuses_url(owner, repo, sha);
        let payload = CreateStatus {
            state: report.state,
            context: &report.context,
            description: &report.description,
            target_url: report.target_url.as_deref(),
        };

        debug!(url = %url, context = %report.context, state = %report.state, "Creating commit status");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status,
                message: format!("Failed to create status: {}", text),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl StatusService for GitHubStatusClient {
    async fn set_status(
        &self,
        pr: &PullRequestRef,
        commit: &str,
        report: &StatusReport,
    ) -> tollgate_core::Result<()> {
        self.create_status(&pr.org, &pr.repo, commit, report)
            .await
            .map_err(Into::into)
    }
}

/// GitHub API errors.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("GITHUB_TOKEN is not set")]
    MissingToken,

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl From<GitHubError> for tollgate_core::Error {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Api { status: 401, .. } | GitHubError::Api { status: 403, .. } => {
                tollgate_core::Error::Unauthorized(err.to_string())
            }
            GitHubError::MissingToken | GitHubError::InvalidUrl(_) => {
                tollgate_core::Error::InvalidInput(err.to_string())
            }
            _ => tollgate_core::Error::Status(err.to_string()),
        }
    }
}
