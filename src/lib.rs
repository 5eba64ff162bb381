#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! ## Pipeline
//!
//! A request flows through these modules, leaves first:
//!
//! - [`validation`] rejects malformed or spam input before any external call
//! - [`reference`] finds and decomposes `github.com/<owner>/<repo>` references
//! - [`session`] remembers the last generated document per conversation and mode
//! - [`github`] retrieves and normalizes repository metadata, optionally cached
//! - [`mode`] classifies the request as a fresh generation or an iteration
//! - [`prompt`] renders the mode-specific instruction set
//! - [`llm`] calls the language model and strips fenced output
//! - [`orchestrator`] sequences all of the above and maps failures to [`ReadmeError`]
//!
//! ## Usage
//! ```rust,ignore
//! use readmeforge::{Config, GenerateRequest, Pipeline, clock::SystemClock};
//! use std::sync::Arc;
//!
//! async fn example() -> readmeforge::Result<()> {
//!     let config = Config::load(None)?;
//!     let pipeline = Pipeline::from_config(&config, Arc::new(SystemClock))?;
//!
//!     let response = pipeline.orchestrator.handle(GenerateRequest {
//!         text: "https://github.com/rust-lang/rust".into(),
//!         session_id: "s1".into(),
//!         mode: Some("readme".into()),
//!     }).await?;
//!     println!("{}", response.document);
//!     Ok(())
//! }
//! ```

/// REST API for the web service
pub mod api;
/// Expiring in-memory key-value storage
pub mod cache;
/// Injected time sources
pub mod clock;
/// Configuration module for the application
pub mod config;
/// Error handling types and utilities
pub mod error;
pub mod github;
pub mod llm;
/// Logging configuration and utilities
pub mod logging;
/// Generation tracks and request classification
pub mod mode;
/// Request pipeline entry point
pub mod orchestrator;
pub mod prompt;
pub mod reference;
/// Background sweeping of expiring stores
pub mod scheduler;
pub mod session;
pub mod validation;

// Re-export common types
pub use config::Config;
pub use error::{CompletionError, FetchError, ReadmeError, Result};
pub use github::{RepositoryFetcher, RepositoryMetadata};
pub use llm::DocumentGenerator;
pub use mode::{CallerMode, GenerationMode};
pub use orchestrator::{GenerateRequest, GenerateResponse, Orchestrator, Pipeline};
pub use reference::RepoReference;
