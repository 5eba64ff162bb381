mod env_manager;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{ReadmeError, Result};

/// Upper bound for every retention and interval setting (one year)
pub const MAX_RETENTION_SECS: u64 = 365 * 24 * 60 * 60;

pub use env_manager::{get_env_value, ApiKeys, GITHUB_TOKEN_VAR, LLM_API_KEY_VAR};

/// Main configuration struct for the application
///
/// Loaded from an optional TOML file, then overlaid with environment
/// variables. Credentials live in [`ApiKeys`] and are always taken from
/// the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Repository host settings
    pub github: GitHubConfig,
    /// Language model settings
    pub llm: LlmConfig,
    /// Iterative-edit memory settings
    pub session: SessionConfig,
    /// Credentials, never written back to disk
    #[serde(skip)]
    pub api_keys: ApiKeys,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server binds to
    pub bind_addr: String,
}

/// Repository host settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL of the REST API
    pub api_base: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Transport timeout in seconds
    pub timeout_secs: u64,
    /// Whether successful lookups are memoized
    pub cache_enabled: bool,
    /// How long a memoized lookup stays valid
    pub cache_ttl_secs: u64,
}

/// Language model settings; fixed per process, never per request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API
    pub api_base: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// System message sent before the rendered prompt
    pub system_prompt: String,
    /// Transport timeout in seconds
    pub timeout_secs: u64,
}

/// Iterative-edit memory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Retention window for generated documents
    pub ttl_secs: u64,
    /// Interval between background sweeps of sessions and cache
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            user_agent: "README-Generator".to_string(),
            timeout_secs: 30,
            cache_enabled: true,
            cache_ttl_secs: 3600, // 1 hour
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            system_prompt: "You are a README generator. Output only markdown.".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            sweep_interval_secs: 30 * 60,
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the default config file
    /// location when `path` is `None`, then applies environment overrides
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReadmeError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ReadmeError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// `<config_dir>/readmeforge/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("readmeforge").join("config.toml"))
    }

    /// Overlays environment variables onto the loaded values
    pub fn apply_env(&mut self) {
        if let Some(addr) = get_env_value("READMEFORGE_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(base) = get_env_value("GITHUB_API_BASE_URL") {
            self.github.api_base = base;
        }
        if let Some(base) = get_env_value("LLM_API_BASE_URL") {
            self.llm.api_base = base;
        }
        self.api_keys = ApiKeys::from_env();
    }

    /// Rejects settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        validate_base_url("github.api_base", &self.github.api_base)?;
        validate_base_url("llm.api_base", &self.llm.api_base)?;

        if self.llm.model.trim().is_empty() {
            return Err(ReadmeError::Config("llm.model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ReadmeError::Config(format!(
                "llm.temperature must be within [0, 2], got {}",
                self.llm.temperature
            )));
        }
        if self.session.ttl_secs == 0 || self.session.sweep_interval_secs == 0 {
            return Err(ReadmeError::Config(
                "session.ttl_secs and session.sweep_interval_secs must be positive".into(),
            ));
        }
        for (field, secs) in [
            ("session.ttl_secs", self.session.ttl_secs),
            ("session.sweep_interval_secs", self.session.sweep_interval_secs),
            ("github.cache_ttl_secs", self.github.cache_ttl_secs),
        ] {
            if secs > MAX_RETENTION_SECS {
                return Err(ReadmeError::Config(format!(
                    "{field} must be at most {MAX_RETENTION_SECS} seconds, got {secs}"
                )));
            }
        }
        if self.github.cache_enabled && self.github.cache_ttl_secs == 0 {
            return Err(ReadmeError::Config(
                "github.cache_ttl_secs must be positive when caching is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Session retention as a clock duration
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session.ttl_secs as i64)
    }

    /// Repository cache retention as a clock duration
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.github.cache_ttl_secs as i64)
    }

    /// Interval between background sweeps
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session.sweep_interval_secs)
    }
}

fn validate_base_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| ReadmeError::Config(format!("{field} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ReadmeError::Config(format!(
            "{field} must use http or https, got {other}"
        ))),
    }
}
