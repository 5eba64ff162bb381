use axum::http::StatusCode;
use thiserror::Error;

use crate::validation::InputRejection;

/// Custom result type alias for the application
pub type Result<T> = std::result::Result<T, ReadmeError>;

/// Failures reported by the repository host
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The repository does not exist or is not visible
    #[error("repository not found")]
    NotFound,

    /// Private repository or exhausted rate limit
    #[error("access to repository forbidden")]
    Forbidden,

    /// Any other non-success status, transport or decoding failure
    #[error("repository host error: {0}")]
    Upstream(String),
}

/// Failures reported by the language model service
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    /// No credential available for the model API
    #[error("language model credential not configured")]
    NotConfigured,

    /// The model call did not succeed
    #[error("language model service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Errors that can occur while serving a generation request
#[derive(Debug, Error)]
pub enum ReadmeError {
    /// Caller selected an unknown generation track
    #[error("invalid mode: {0:?}")]
    InvalidMode(Option<String>),

    /// Input rejected by the validator
    #[error("invalid input: {0}")]
    InvalidInput(InputRejection),

    /// Request body could not be decoded
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// README mode without a reference and without a previous document
    #[error("repository URL required")]
    UrlRequired,

    /// Template mode received a repository reference
    #[error("repository URL not allowed in template mode")]
    UrlNotAllowed,

    /// More than one distinct repository reference
    #[error("multiple repository URLs")]
    MultipleUrls,

    /// Reference matched but could not be parsed into owner/repo
    #[error("invalid repository URL: {0}")]
    InvalidUrl(String),

    /// Repository host errors
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Language model errors
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    /// Anything else; reported as an opaque server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReadmeError {
    /// Stable machine-readable kind reported to callers
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidMode(_) => "invalid_mode",
            Self::InvalidInput(_) | Self::MalformedRequest(_) => "invalid_input",
            Self::UrlRequired => "url_required",
            Self::UrlNotAllowed => "url_not_allowed",
            Self::MultipleUrls => "multiple_urls",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Fetch(FetchError::NotFound) => "repo_not_found",
            Self::Fetch(FetchError::Forbidden) => "forbidden",
            Self::Fetch(FetchError::Upstream(_)) => "github_error",
            Self::Completion(_) => "ai_error",
            Self::Config(_) | Self::IO(_) | Self::Internal(_) => "server_error",
        }
    }

    /// HTTP status class associated with [`kind`](Self::kind)
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidMode(_)
            | Self::InvalidInput(_)
            | Self::MalformedRequest(_)
            | Self::UrlRequired
            | Self::UrlNotAllowed
            | Self::MultipleUrls
            | Self::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Self::Fetch(FetchError::NotFound) => StatusCode::NOT_FOUND,
            Self::Fetch(FetchError::Forbidden) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the end user.
    ///
    /// Model and internal failures are collapsed into generic text so that
    /// credentials and upstream details never leave the process.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidMode(_) => "Invalid mode. Must be 'readme' or 'template'".to_string(),
            Self::InvalidInput(rejection) => rejection.to_string(),
            Self::MalformedRequest(_) => {
                "Request body must be JSON with text, sessionId and mode".to_string()
            }
            Self::UrlRequired => "Please provide a GitHub URL for README generation".to_string(),
            Self::UrlNotAllowed => {
                "Template mode doesn't use URLs. Switch to README tab or remove the URL"
                    .to_string()
            }
            Self::MultipleUrls => "Please provide only one GitHub URL at a time".to_string(),
            Self::InvalidUrl(_) => "Invalid GitHub URL format".to_string(),
            Self::Fetch(FetchError::NotFound) => {
                "Repository not found. Check URL and ensure repo is public".to_string()
            }
            Self::Fetch(FetchError::Forbidden) => {
                "Cannot access private repository or rate limit exceeded".to_string()
            }
            Self::Fetch(FetchError::Upstream(_)) => "GitHub API error. Please try again".to_string(),
            Self::Completion(_) => "AI service unavailable. Please try again".to_string(),
            Self::Config(_) | Self::IO(_) | Self::Internal(_) => "Something went wrong".to_string(),
        }
    }

    /// Optional hint on how to fix the request
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidUrl(_) => Some("Use format: https://github.com/owner/repo"),
            _ => None,
        }
    }

    /// Errors caused by the caller's input; no external call was attempted
    pub fn is_input_error(&self) -> bool {
        self.status_code() == StatusCode::BAD_REQUEST
    }
}
