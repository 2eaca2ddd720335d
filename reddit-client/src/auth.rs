use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    ResourceOwnerPassword, ResourceOwnerUsername, Scope, TokenResponse, TokenUrl,
};
use phaws_core::{AuthenticationError, RedditApiError};
use reqwest::Client;
use std::fmt;
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info};

pub const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

// Reddit issues hour-long script tokens; used when the response omits expires_in.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct RedditOAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub auth_url: String,
    pub token_url: String,
}

impl RedditOAuth2Config {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
            auth_url: REDDIT_AUTH_URL.to_string(),
            token_url: REDDIT_TOKEN_URL.to_string(),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

#[derive(Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }
}

impl fmt::Debug for RedditToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditToken")
            .field("access_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Script-app authentication: exchanges the account's username and password
/// for a bearer token using the resource owner password grant.
#[derive(Debug, Clone)]
pub struct PasswordAuthenticator {
    client: BasicClient,
    http_client: Client,
}

impl PasswordAuthenticator {
    pub fn new(
        config: &RedditOAuth2Config,
        http_client: Client,
    ) -> Result<Self, AuthenticationError> {
        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(config.auth_url.clone()).map_err(|e| {
                AuthenticationError::ClientSetup {
                    reason: format!("invalid auth URL: {e}"),
                }
            })?,
            Some(TokenUrl::new(config.token_url.clone()).map_err(|e| {
                AuthenticationError::ClientSetup {
                    reason: format!("invalid token URL: {e}"),
                }
            })?),
        );

        Ok(Self {
            client,
            http_client,
        })
    }

    pub fn required_scopes() -> Vec<&'static str> {
        vec!["identity", "submit"]
    }

    pub async fn exchange_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<RedditToken, AuthenticationError> {
        info!("Requesting access token for u/{}", username);

        let username = ResourceOwnerUsername::new(username.to_string());
        let password = ResourceOwnerPassword::new(password.to_string());
        let scopes = Self::required_scopes()
            .into_iter()
            .map(|s| Scope::new(s.to_string()));

        let result = self
            .client
            .exchange_password(&username, &password)
            .add_scopes(scopes)
            .request_async(|request| send_token_request(&self.http_client, request))
            .await;

        let token = result.map_err(|e| {
            let auth_error = token_error(e);
            error!("Token exchange failed: {}", auth_error);
            auth_error
        })?;

        let expires_in = token.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let scope = token
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        debug!("Token exchange successful, expires in {:?}", expires_in);
        Ok(RedditToken {
            access_token: token.access_token().secret().to_string(),
            expires_at: SystemTime::now() + expires_in,
            scope,
        })
    }
}

/// Sends the token request through our own client so the configured
/// User-Agent reaches Reddit.
async fn send_token_request(
    http_client: &Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http_client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

/// Transport failures keep the underlying `reqwest::Error` as their source;
/// everything else is a rejected grant.
pub(crate) fn token_error(
    err: RequestTokenError<reqwest::Error, BasicErrorResponse>,
) -> AuthenticationError {
    let rejected = |reason: String| AuthenticationError::TokenExchangeFailed { reason };
    match err {
        RequestTokenError::Request(e) => {
            AuthenticationError::TokenRequest(RedditApiError::Network(e))
        }
        RequestTokenError::ServerResponse(response) => rejected(response.to_string()),
        // Reddit answers bad passwords with 200 {"error": "invalid_grant"}, which
        // fails token parsing rather than arriving as an error response.
        RequestTokenError::Parse(e, body) => rejected(
            reddit_error_from_body(&body).unwrap_or_else(|| format!("unparseable response: {e}")),
        ),
        RequestTokenError::Other(message) => rejected(message),
    }
}

pub(crate) fn reddit_error_from_body(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let error = value.get("error")?;
    let message = value.get("message").and_then(|m| m.as_str());

    let code = match error {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };

    Some(match message {
        Some(message) => format!("{code}: {message}"),
        None => code,
    })
}
