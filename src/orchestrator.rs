use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{ReadmeError, Result};
use crate::github::{CachedFetcher, GitHubClient, RepositoryFetcher};
use crate::llm::{ChatCompletionClient, DocumentGenerator};
use crate::mode::{resolve_mode, CallerMode, GenerationMode};
use crate::prompt::build_prompt;
use crate::reference::{distinct_references, extract_references, parse_reference, strip_references};
use crate::scheduler::{spawn_sweeper, Sweep};
use crate::session::{session_key, SessionStore};
use crate::validation::validate_input;

/// One incoming generation call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    /// Free-form user text, optionally containing a repository URL
    #[serde(alias = "message")]
    pub text: String,
    /// Opaque per-conversation token chosen by the caller
    #[serde(alias = "session_id")]
    pub session_id: String,
    /// `readme` or `template`
    pub mode: Option<String>,
}

/// Successful generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Raw markdown document
    pub document: String,
    /// State the request was resolved to
    pub mode: GenerationMode,
    /// Whether repository metadata was used
    pub has_reference_data: bool,
    /// Repository name when metadata was used
    pub repository_name: Option<String>,
}

/// Sequences validation, reference parsing, mode resolution, fetching,
/// prompt building and generation for a single request
pub struct Orchestrator {
    fetcher: Arc<dyn RepositoryFetcher>,
    generator: Arc<dyn DocumentGenerator>,
    sessions: Arc<SessionStore>,
}

impl Orchestrator {
    /// Wires the pipeline from its collaborators
    pub fn new(
        fetcher: Arc<dyn RepositoryFetcher>,
        generator: Arc<dyn DocumentGenerator>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            fetcher,
            generator,
            sessions,
        }
    }

    /// Session store backing iterative edits
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Runs one request through the pipeline.
    ///
    /// Input errors return before any external call. The session store is
    /// written only after the model produced a document.
    pub async fn handle(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let caller: CallerMode = match request.mode.as_deref() {
            Some(mode) => mode.parse()?,
            None => return Err(ReadmeError::InvalidMode(None)),
        };
        debug!(%caller, text_len = request.text.len(), "handling generation request");

        validate_input(&request.text).map_err(ReadmeError::InvalidInput)?;

        let found = extract_references(&request.text);
        let distinct = distinct_references(&found);
        debug!(references = ?distinct, "extracted repository references");

        if distinct.len() > 1 {
            return Err(ReadmeError::MultipleUrls);
        }
        if caller == CallerMode::Template && !distinct.is_empty() {
            return Err(ReadmeError::UrlNotAllowed);
        }

        let reference = match distinct.first() {
            Some(raw) => Some(
                parse_reference(raw).ok_or_else(|| ReadmeError::InvalidUrl(raw.to_string()))?,
            ),
            None => None,
        };
        let free_text = strip_references(&request.text, &found);

        let key = session_key(&request.session_id, caller);
        let prior = match &key {
            Some(key) => self.sessions.get(key).await,
            None => None,
        };

        let mode = resolve_mode(caller, reference.is_some(), prior.is_some())?;
        info!(%caller, %mode, "resolved generation mode");

        let metadata = match &reference {
            Some(reference) => {
                let metadata = self.fetcher.fetch(reference).await.map_err(|e| {
                    warn!(%reference, error = %e, "repository fetch failed");
                    e
                })?;
                Some(metadata)
            }
            None => None,
        };

        let previous_document = match mode {
            GenerationMode::Iteration => prior.as_ref().map(|record| record.previous_document.as_str()),
            _ => None,
        };
        let prompt = build_prompt(mode, metadata.as_ref(), &free_text, previous_document);
        debug!(prompt_len = prompt.len(), "prompt built");

        let document = self.generator.generate(&prompt).await.map_err(|e| {
            warn!(error = %e, "document generation failed");
            e
        })?;

        if let Some(key) = &key {
            self.sessions.put(key, &document).await;
        }

        Ok(GenerateResponse {
            document,
            mode,
            has_reference_data: metadata.is_some(),
            repository_name: metadata.map(|m| m.name),
        })
    }
}

/// Fully wired pipeline plus the stores that need periodic sweeping
pub struct Pipeline {
    /// Request entry point
    pub orchestrator: Arc<Orchestrator>,
    /// Iterative-edit memory
    pub sessions: Arc<SessionStore>,
    /// Repository metadata cache, when enabled
    pub repository_cache: Option<Arc<CachedFetcher>>,
}

impl Pipeline {
    /// Builds the production clients from configuration
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let github = GitHubClient::new(&config.github, config.api_keys.github_token.clone())
            .map_err(|e| ReadmeError::Config(format!("Failed to build GitHub client: {}", e)))?;
        let generator = ChatCompletionClient::new(&config.llm, config.api_keys.llm_api_key.clone())
            .map_err(|e| ReadmeError::Config(format!("Failed to build model client: {}", e)))?;

        if !github.is_authenticated() {
            info!("no GitHub token configured; using unauthenticated rate limits");
        }
        if !generator.is_configured() {
            warn!("no model API key configured; generation requests will fail");
        }

        let sessions = Arc::new(SessionStore::with_retention(config.session_ttl(), clock.clone()));

        let github: Arc<dyn RepositoryFetcher> = Arc::new(github);
        let repository_cache = config
            .github
            .cache_enabled
            .then(|| Arc::new(CachedFetcher::new(github.clone(), config.cache_ttl(), clock)));
        let fetcher: Arc<dyn RepositoryFetcher> = match &repository_cache {
            Some(cache) => cache.clone(),
            None => github,
        };

        let orchestrator = Arc::new(Orchestrator::new(
            fetcher,
            Arc::new(generator),
            sessions.clone(),
        ));

        Ok(Self {
            orchestrator,
            sessions,
            repository_cache,
        })
    }

    /// Starts one background sweeper per store
    pub fn spawn_sweepers(&self, interval: Duration, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        let sessions: Arc<dyn Sweep> = self.sessions.clone();
        let mut targets = vec![("sessions", sessions)];
        if let Some(cache) = &self.repository_cache {
            let cache: Arc<dyn Sweep> = cache.clone();
            targets.push(("repository-cache", cache));
        }

        targets
            .into_iter()
            .map(|(name, target)| spawn_sweeper(name, interval, target, cancel.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_message_alias() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"message": "hello world", "sessionId": "s1", "mode": "readme"}"#)
                .unwrap();
        assert_eq!(request.text, "hello world");
        assert_eq!(request.session_id, "s1");
        assert_eq!(request.mode.as_deref(), Some("readme"));

        let request: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.mode, None);
    }

    #[test]
    fn test_response_wire_shape() {
        let response = GenerateResponse {
            document: "# widget".into(),
            mode: GenerationMode::NewWithReference,
            has_reference_data: true,
            repository_name: Some("widget".into()),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "document": "# widget",
                "mode": "new_with_reference",
                "hasReferenceData": true,
                "repositoryName": "widget"
            })
        );
    }
}
