use crate::error::*;
use tracing::{error, info};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            CoreError::Authentication(e) => {
                error!("Authentication error details: {:?}", e);
            }
            CoreError::Submission(e) => {
                error!("Submission error details: {:?}", e);
            }
        }
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Authentication(e) => e.user_friendly_message(),
            CoreError::Submission(e) => e.user_friendly_message(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Config(e) => e.error_code(),
            CoreError::Authentication(e) => e.error_code(),
            CoreError::Submission(e) => e.error_code(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::MissingEnvironmentVariable { var_name } => {
                format!("Missing required environment variable: {}", var_name)
            }
            ConfigError::InvalidValue { field, value } => {
                format!("Invalid value '{}' for {}.", value, field)
            }
            ConfigError::EmptySubredditList => {
                "No target subreddits configured. Check REDDIT_TARGET_SUBREDDITS.".to_string()
            }
            ConfigError::EmptyContentPool => {
                "The content pool has no posts to choose from.".to_string()
            }
            ConfigError::ContentPoolUnreadable { path, .. } => {
                format!("Could not read the content pool file at {}.", path)
            }
            ConfigError::Parse(_) => "The content pool file is not valid TOML.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::EmptySubredditList => "CONFIG_NO_SUBREDDITS".to_string(),
            ConfigError::EmptyContentPool => "CONFIG_EMPTY_POOL".to_string(),
            ConfigError::ContentPoolUnreadable { .. } => "CONFIG_POOL_UNREADABLE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE".to_string(),
        }
    }
}

impl ErrorExt for AuthenticationError {
    fn log_error(&self) -> &Self {
        error!("AuthenticationError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            AuthenticationError::ClientSetup { reason } => {
                format!("Could not set up the Reddit client: {}", reason)
            }
            AuthenticationError::TokenExchangeFailed { .. } => {
                "Reddit authentication failed. Please check your credentials.".to_string()
            }
            AuthenticationError::TokenRequest(e) => {
                format!("Could not reach Reddit's token endpoint. {}", e.user_friendly_message())
            }
            AuthenticationError::IdentityCheckFailed(e) => e.user_friendly_message(),
            AuthenticationError::IdentityMismatch { expected, actual } => format!(
                "Credentials belong to u/{} but REDDIT_USERNAME is u/{}.",
                actual, expected
            ),
        }
    }

    fn error_code(&self) -> String {
        match self {
            AuthenticationError::ClientSetup { .. } => "AUTH_CLIENT_SETUP".to_string(),
            AuthenticationError::TokenExchangeFailed { .. } => "AUTH_TOKEN_EXCHANGE".to_string(),
            AuthenticationError::TokenRequest(_) => "AUTH_TOKEN_REQUEST".to_string(),
            AuthenticationError::IdentityCheckFailed(_) => "AUTH_IDENTITY_CHECK".to_string(),
            AuthenticationError::IdentityMismatch { .. } => "AUTH_IDENTITY_MISMATCH".to_string(),
        }
    }
}

impl ErrorExt for SubmissionError {
    fn log_error(&self) -> &Self {
        error!("SubmissionError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            SubmissionError::Api { subreddit, source } => format!(
                "Posting to r/{} failed. {}",
                subreddit,
                source.user_friendly_message()
            ),
            SubmissionError::Rejected { subreddit, reason } => {
                format!("r/{} rejected the post: {}", subreddit, reason)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            SubmissionError::Api { source, .. } => format!("SUBMIT_{}", source.error_code()),
            SubmissionError::Rejected { .. } => "SUBMIT_REJECTED".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::InvalidToken => {
                "Reddit authentication token is invalid or expired.".to_string()
            }
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. The account may not be allowed to post there.",
                resource
            ),
            RedditApiError::NotFound { resource } => {
                format!("Reddit could not find {}.", resource)
            }
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Reddit asked to wait {} seconds.",
                retry_after
            ),
            RedditApiError::ServerError { status_code } => {
                format!("Reddit returned a server error ({}).", status_code)
            }
            RedditApiError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            _ => "Reddit API error occurred.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::NotFound { .. } => "REDDIT_NOT_FOUND".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
            RedditApiError::UnexpectedStatus { .. } => "REDDIT_UNEXPECTED_STATUS".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::Network(_) => "REDDIT_NETWORK".to_string(),
        }
    }
}

/// Emits the final diagnostic for a failed run.
pub struct ErrorReporter {
    report_errors: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {}", error.error_code());
            info!("User message: {}", error.user_friendly_message());
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
