pub mod api;
pub mod auth;


pub use api::{RedditApiClient, RedditUserData, SubmitRequest, REDDIT_API_BASE};
pub use auth::{PasswordAuthenticator, RedditOAuth2Config, RedditToken};

use async_trait::async_trait;
use phaws_core::{
    AuthenticationError, PostResult, RedditApiError, RedditCredentials, SubmissionError,
};
use reqwest::Client;
use tracing::{info, warn};

/// An authenticated handle to the Reddit API.
#[async_trait]
pub trait RedditSession: Send + Sync {
    /// `GET /api/v1/me`: the account the session is authenticated as.
    async fn me(&self) -> Result<RedditUserData, RedditApiError>;

    async fn submit(&self, request: &SubmitRequest) -> Result<PostResult, SubmissionError>;
}

/// Produces sessions from credentials. Separate from [`RedditSession`] so the
/// pipeline can be driven by stub sessions in tests.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    type Session: RedditSession;

    async fn connect(
        &self,
        credentials: &RedditCredentials,
        user_agent: &str,
    ) -> Result<Self::Session, AuthenticationError>;
}

#[derive(Debug, Clone)]
pub struct RedditEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub api_base: String,
}

impl Default for RedditEndpoints {
    fn default() -> Self {
        Self {
            auth_url: auth::REDDIT_AUTH_URL.to_string(),
            token_url: auth::REDDIT_TOKEN_URL.to_string(),
            api_base: REDDIT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RedditConnector {
    endpoints: RedditEndpoints,
}

impl RedditConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoints(endpoints: RedditEndpoints) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &RedditEndpoints {
        &self.endpoints
    }

    fn http_client(user_agent: &str) -> Result<Client, AuthenticationError> {
        Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| AuthenticationError::ClientSetup {
                reason: format!("failed to create HTTP client: {e}"),
            })
    }

    fn oauth_config(
        &self,
        credentials: &RedditCredentials,
        user_agent: &str,
    ) -> RedditOAuth2Config {
        let mut config = RedditOAuth2Config::new(
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
            user_agent.to_string(),
        )
        .with_token_url(self.endpoints.token_url.clone());
        config.auth_url = self.endpoints.auth_url.clone();
        config
    }
}

#[async_trait]
impl SessionConnector for RedditConnector {
    type Session = RedditClient;

    async fn connect(
        &self,
        credentials: &RedditCredentials,
        user_agent: &str,
    ) -> Result<RedditClient, AuthenticationError> {
        let http_client = Self::http_client(user_agent)?;
        let config = self.oauth_config(credentials, user_agent);
        let authenticator = PasswordAuthenticator::new(&config, http_client.clone())?;

        let token = authenticator
            .exchange_password(&credentials.username, &credentials.password)
            .await?;
        info!("Obtained access token with scopes {:?}", token.scope);

        Ok(RedditClient {
            api: RedditApiClient::new(http_client, self.endpoints.api_base.clone()),
            token,
        })
    }
}

#[derive(Debug)]
pub struct RedditClient {
    api: RedditApiClient,
    token: RedditToken,
}

impl RedditClient {
    pub fn new(api: RedditApiClient, token: RedditToken) -> Self {
        Self { api, token }
    }

    pub fn token(&self) -> &RedditToken {
        &self.token
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_expired()
    }
}

#[async_trait]
impl RedditSession for RedditClient {
    async fn me(&self) -> Result<RedditUserData, RedditApiError> {
        self.api.get_user_info(&self.token.access_token).await
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<PostResult, SubmissionError> {
        if !self.is_authenticated() {
            warn!("Access token has expired; Reddit will likely reject the submission");
        }
        self.api.submit(&self.token.access_token, request).await
    }
}
