use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("No target subreddits configured")]
    EmptySubredditList,

    #[error("Content pool contains no posts")]
    EmptyContentPool,

    #[error("Content pool could not be read from {path}: {source}")]
    ContentPoolUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Content pool parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum AuthenticationError {
    #[error("Failed to set up Reddit client: {reason}")]
    ClientSetup { reason: String },

    #[error("Token exchange failed: {reason}")]
    TokenExchangeFailed { reason: String },

    #[error("Token request failed: {0}")]
    TokenRequest(#[source] RedditApiError),

    #[error("Identity check failed: {0}")]
    IdentityCheckFailed(#[source] RedditApiError),

    #[error("Authenticated as u/{actual}, expected u/{expected}")]
    IdentityMismatch { expected: String, actual: String },
}

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Submitting to r/{subreddit} failed: {source}")]
    Api {
        subreddit: String,
        #[source]
        source: RedditApiError,
    },

    #[error("r/{subreddit} rejected the post: {reason}")]
    Rejected { subreddit: String, reason: String },
}

#[derive(Error, Debug)]
pub enum RedditApiError {
    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },

    #[error("Unexpected status {status_code} from {endpoint}")]
    UnexpectedStatus { status_code: u16, endpoint: String },

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
