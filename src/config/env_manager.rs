use std::fmt;

/// Environment variable holding the GitHub token
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
/// Environment variable holding the model API key
pub const LLM_API_KEY_VAR: &str = "GROQ_API_KEY";

/// Credentials for the upstream services
///
/// Only ever read from the process environment; never serialized or logged.
#[derive(Clone, Default)]
pub struct ApiKeys {
    /// GitHub token for authenticated (higher rate limit) requests
    pub github_token: Option<String>,
    /// Bearer key for the chat completion API
    pub llm_api_key: Option<String>,
}

impl ApiKeys {
    /// Loads API keys from the environment
    pub fn from_env() -> Self {
        Self {
            github_token: get_env_value(GITHUB_TOKEN_VAR),
            llm_api_key: get_env_value(LLM_API_KEY_VAR),
        }
    }
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeys")
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Reads an environment variable, treating empty or blank values as unset
pub fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let keys = ApiKeys {
            github_token: Some("ghp_secret".into()),
            llm_api_key: None,
        };
        let printed = format!("{keys:?}");
        assert!(!printed.contains("ghp_secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_blank_env_value_is_unset() {
        std::env::set_var("READMEFORGE_TEST_BLANK", "   ");
        assert_eq!(get_env_value("READMEFORGE_TEST_BLANK"), None);
        std::env::set_var("READMEFORGE_TEST_BLANK", "value");
        assert_eq!(get_env_value("READMEFORGE_TEST_BLANK").as_deref(), Some("value"));
    }
}
