#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use readmeforge::clock::ManualClock;
use readmeforge::error::{CompletionError, FetchError};
use readmeforge::github::{RepositoryFetcher, RepositoryMetadata};
use readmeforge::llm::DocumentGenerator;
use readmeforge::reference::RepoReference;
use readmeforge::session::SessionStore;
use readmeforge::{GenerateRequest, Orchestrator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub mod test_helpers {
    use super::*;

    pub fn setup_test_logger() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }

    pub fn sample_metadata(owner: &str, repo: &str) -> RepositoryMetadata {
        RepositoryMetadata {
            name: repo.to_string(),
            full_name: format!("{owner}/{repo}"),
            description: "A small widget library".to_string(),
            primary_language: "Rust".to_string(),
            star_count: 42,
            fork_count: 7,
            topics: vec!["cli".to_string(), "widgets".to_string()],
            license: Some("MIT License".to_string()),
            homepage: None,
            default_branch: "main".to_string(),
        }
    }

    pub fn request(text: &str, session_id: &str, mode: &str) -> GenerateRequest {
        GenerateRequest {
            text: text.to_string(),
            session_id: session_id.to_string(),
            mode: Some(mode.to_string()),
        }
    }

    /// Repository host stand-in that answers from a fixed result
    pub struct StubFetcher {
        result: Result<RepositoryMetadata, FetchError>,
        pub calls: AtomicUsize,
        pub seen: Mutex<Vec<RepoReference>>,
    }

    impl StubFetcher {
        pub fn returning(metadata: RepositoryMetadata) -> Self {
            Self::with_result(Ok(metadata))
        }

        pub fn failing(error: FetchError) -> Self {
            Self::with_result(Err(error))
        }

        fn with_result(result: Result<RepositoryMetadata, FetchError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RepositoryFetcher for StubFetcher {
        async fn fetch(&self, reference: &RepoReference) -> Result<RepositoryMetadata, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(reference.clone());
            self.result.clone()
        }
    }

    /// Model stand-in that records prompts and replays queued outputs
    pub struct StubGenerator {
        outputs: Mutex<Vec<Result<String, CompletionError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        /// Replays `outputs` in order, then repeats the last one
        pub fn replying(outputs: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                outputs: Mutex::new(outputs),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn always(document: &str) -> Self {
            Self::replying(vec![Ok(document.to_string())])
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl DocumentGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut outputs = self.outputs.lock().unwrap();
            if outputs.len() > 1 {
                outputs.remove(0)
            } else {
                outputs.first().cloned().unwrap_or_else(|| Ok(String::new()))
            }
        }
    }

    /// Orchestrator over stubs and a clock the test controls
    pub struct Harness {
        pub orchestrator: Orchestrator,
        pub fetcher: Arc<StubFetcher>,
        pub generator: Arc<StubGenerator>,
        pub clock: Arc<ManualClock>,
    }

    impl Harness {
        pub fn new(fetcher: StubFetcher, generator: StubGenerator) -> Self {
            let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()));
            let fetcher = Arc::new(fetcher);
            let generator = Arc::new(generator);
            let sessions = Arc::new(SessionStore::new(clock.clone()));
            let orchestrator = Orchestrator::new(fetcher.clone(), generator.clone(), sessions);
            Self {
                orchestrator,
                fetcher,
                generator,
                clock,
            }
        }

        pub fn advance_minutes(&self, minutes: i64) {
            self.clock.advance(Duration::minutes(minutes));
        }

        pub fn external_calls(&self) -> usize {
            self.fetcher.calls() + self.generator.calls()
        }
    }
}
