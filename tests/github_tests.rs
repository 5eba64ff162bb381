use chrono::{Duration, Utc};
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use readmeforge::clock::ManualClock;
use readmeforge::config::GitHubConfig;
use readmeforge::error::FetchError;
use readmeforge::github::{CachedFetcher, GitHubClient, RepositoryFetcher};
use readmeforge::reference::RepoReference;
use std::sync::Arc;
use test_case::test_case;

mod common;
use common::test_helpers::*;

fn client_for(server: &mockito::ServerGuard, token: Option<&str>) -> GitHubClient {
    let config = GitHubConfig {
        api_base: server.url(),
        cache_enabled: false,
        ..GitHubConfig::default()
    };
    GitHubClient::new(&config, token.map(str::to_string)).unwrap()
}

fn widget() -> RepoReference {
    RepoReference {
        owner: "acme".to_string(),
        repo: "widget".to_string(),
    }
}

const FULL_PAYLOAD: &str = r#"{
    "name": "widget",
    "full_name": "acme/widget",
    "description": "A small widget library",
    "language": "Rust",
    "stargazers_count": 42,
    "forks_count": 7,
    "topics": ["cli", "widgets"],
    "license": {"key": "mit", "name": "MIT License", "spdx_id": "MIT"},
    "homepage": "https://widget.dev",
    "default_branch": "trunk",
    "private": false
}"#;

#[tokio::test]
async fn test_fetch_normalizes_full_payload() {
    setup_test_logger();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/acme/widget")
        .match_header("accept", "application/vnd.github.v3+json")
        .match_header("user-agent", "README-Generator")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(FULL_PAYLOAD)
        .create_async()
        .await;

    let metadata = client_for(&server, None).fetch(&widget()).await.unwrap();
    mock.assert_async().await;

    assert_eq!(metadata.name, "widget");
    assert_eq!(metadata.full_name, "acme/widget");
    assert_eq!(metadata.description, "A small widget library");
    assert_eq!(metadata.primary_language, "Rust");
    assert_eq!(metadata.star_count, 42);
    assert_eq!(metadata.fork_count, 7);
    assert_eq!(metadata.topics, vec!["cli", "widgets"]);
    assert_eq!(metadata.license.as_deref(), Some("MIT License"));
    assert_eq!(metadata.homepage.as_deref(), Some("https://widget.dev"));
    assert_eq!(metadata.default_branch, "trunk");
}

#[tokio::test]
async fn test_fetch_fills_defaults_for_sparse_payload() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/acme/widget")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"name": "widget", "description": null, "language": null, "license": null, "homepage": ""}"#)
        .create_async()
        .await;

    let metadata = client_for(&server, None).fetch(&widget()).await.unwrap();

    assert_eq!(metadata.description, "No description provided");
    assert_eq!(metadata.primary_language, "Not specified");
    assert_eq!(metadata.star_count, 0);
    assert_eq!(metadata.fork_count, 0);
    assert!(metadata.topics.is_empty());
    assert_eq!(metadata.license, None);
    assert_eq!(metadata.homepage, None);
    assert_eq!(metadata.default_branch, "main");
}

#[tokio::test]
async fn test_fetch_sends_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/acme/widget")
        .match_header("authorization", "Bearer ghp_test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(FULL_PAYLOAD)
        .create_async()
        .await;

    let client = client_for(&server, Some("ghp_test"));
    assert!(client.is_authenticated());
    client.fetch(&widget()).await.unwrap();
    mock.assert_async().await;
}

#[test_case(404, FetchError::NotFound ; "not found")]
#[test_case(403, FetchError::Forbidden ; "forbidden")]
#[tokio::test]
async fn test_fetch_maps_status(status: usize, expected: FetchError) {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/acme/widget")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "nope"}"#)
        .create_async()
        .await;

    let error = client_for(&server, None).fetch(&widget()).await.unwrap_err();
    assert_eq!(error, expected);
}

#[tokio::test]
async fn test_fetch_server_error_is_upstream() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/acme/widget")
        .with_status(500)
        .create_async()
        .await;

    let error = client_for(&server, None).fetch(&widget()).await.unwrap_err();
    assert!(matches!(error, FetchError::Upstream(_)));
}

#[tokio::test]
async fn test_fetch_undecodable_body_is_upstream() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/acme/widget")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let error = client_for(&server, None).fetch(&widget()).await.unwrap_err();
    assert!(matches!(error, FetchError::Upstream(_)));
}

#[tokio::test]
async fn test_cached_fetcher_hits_host_once_within_ttl() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/acme/widget")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(FULL_PAYLOAD)
        .expect(2)
        .create_async()
        .await;

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let cached = CachedFetcher::new(
        Arc::new(client_for(&server, None)),
        Duration::hours(1),
        clock.clone(),
    );

    let first = cached.fetch(&widget()).await.unwrap();
    let second = cached.fetch(&widget()).await.unwrap();
    assert_eq!(first, second);

    clock.advance(Duration::minutes(61));
    cached.fetch(&widget()).await.unwrap();

    mock.assert_async().await;
}
