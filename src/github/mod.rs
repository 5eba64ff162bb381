//! Repository metadata retrieval from the GitHub REST API.

mod cached;
mod metadata;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::GitHubConfig;
use crate::error::FetchError;
use crate::reference::RepoReference;

pub use cached::CachedFetcher;
pub use metadata::{
    RawLicense, RawRepository, RepositoryMetadata, DEFAULT_BRANCH, DEFAULT_DESCRIPTION,
    DEFAULT_LANGUAGE,
};

/// Source of normalized repository metadata
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    /// Looks up `reference` on the repository host
    async fn fetch(&self, reference: &RepoReference) -> Result<RepositoryMetadata, FetchError>;
}

/// Client for `GET /repos/{owner}/{repo}`
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
    user_agent: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Builds a client from configuration and an optional bearer token
    pub fn new(config: &GitHubConfig, token: Option<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Upstream(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            token,
        })
    }

    /// Whether requests carry a credential
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn repository_url(&self, reference: &RepoReference) -> String {
        format!("{}/repos/{}/{}", self.api_base, reference.owner, reference.repo)
    }
}

#[async_trait]
impl RepositoryFetcher for GitHubClient {
    async fn fetch(&self, reference: &RepoReference) -> Result<RepositoryMetadata, FetchError> {
        let url = self.repository_url(reference);
        debug!(%reference, authenticated = self.is_authenticated(), "fetching repository");

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", &self.user_agent);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%reference, error = %e, "repository request failed");
            FetchError::Upstream(e.to_string())
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(FetchError::NotFound),
            StatusCode::FORBIDDEN => return Err(FetchError::Forbidden),
            status if !status.is_success() => {
                return Err(FetchError::Upstream(format!("unexpected status {}", status)))
            }
            _ => {}
        }

        let raw = response
            .json::<RawRepository>()
            .await
            .map_err(|e| FetchError::Upstream(format!("undecodable repository payload: {}", e)))?;

        Ok(RepositoryMetadata::normalize(raw, reference))
    }
}
