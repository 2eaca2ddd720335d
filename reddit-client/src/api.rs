use phaws_core::{PostKind, PostPayload, PostResult, RedditApiError, SubmissionError};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditUserData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub link_karma: i64,
    #[serde(default)]
    pub comment_karma: i64,
    #[serde(default)]
    pub has_verified_email: Option<bool>,
}

/// Form body for `POST /api/submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub subreddit: String,
    pub title: String,
    pub kind: PostKind,
}

impl SubmitRequest {
    pub fn new(subreddit: &str, payload: &PostPayload) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            title: payload.title.clone(),
            kind: payload.kind(),
        }
    }

    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("api_type", "json".to_string()),
            ("sr", self.subreddit.clone()),
            ("title", self.title.clone()),
            ("kind", self.kind.as_api_kind().to_string()),
            ("resubmit", "true".to_string()),
            ("sendreplies", "true".to_string()),
        ];
        match &self.kind {
            PostKind::Link { url } => fields.push(("url", url.clone())),
            PostKind::SelfText { text } => fields.push(("text", text.clone())),
        }
        fields
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub json: SubmitResponseJson,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponseJson {
    #[serde(default)]
    pub errors: Vec<Vec<serde_json::Value>>,
    pub data: Option<SubmitResponseData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponseData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub url: String,
}

impl SubmitResponse {
    /// Turns Reddit's `api_type=json` envelope into a post result. A non-empty
    /// `errors` list means the subreddit refused the post.
    pub fn into_result(self, subreddit: &str) -> Result<PostResult, SubmissionError> {
        if !self.json.errors.is_empty() {
            let reason = self
                .json
                .errors
                .iter()
                .map(|entry| describe_submit_error(entry))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SubmissionError::Rejected {
                subreddit: subreddit.to_string(),
                reason,
            });
        }

        let data = self.json.data.ok_or_else(|| SubmissionError::Api {
            subreddit: subreddit.to_string(),
            source: RedditApiError::InvalidResponse {
                details: "submit response has neither errors nor data".to_string(),
            },
        })?;

        let permalink = permalink_from_url(&data.url).ok_or_else(|| SubmissionError::Api {
            subreddit: subreddit.to_string(),
            source: RedditApiError::InvalidResponse {
                details: format!("unusable post URL: {}", data.url),
            },
        })?;

        let id = if data.id.is_empty() {
            data.name.trim_start_matches("t3_").to_string()
        } else {
            data.id
        };

        Ok(PostResult { id, permalink })
    }
}

// Entries look like ["SUBREDDIT_NOEXIST", "that subreddit doesn't exist", "sr"].
fn describe_submit_error(entry: &[serde_json::Value]) -> String {
    let parts: Vec<&str> = entry.iter().take(2).filter_map(|v| v.as_str()).collect();
    match parts.as_slice() {
        [code, message] => format!("{code}: {message}"),
        [code] => code.to_string(),
        _ => "unknown error".to_string(),
    }
}

pub fn permalink_from_url(url: &str) -> Option<String> {
    if url.starts_with('/') {
        return Some(url.to_string());
    }
    let parsed = url::Url::parse(url).ok()?;
    let path = parsed.path();
    if path.is_empty() || path == "/" {
        None
    } else {
        Some(path.to_string())
    }
}

/// Maps a non-success status to its API error. Returns `None` for 2xx.
pub fn classify_status(
    status: StatusCode,
    headers: &HeaderMap,
    endpoint: &str,
) -> Option<RedditApiError> {
    if status.is_success() {
        return None;
    }

    let error = match status.as_u16() {
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => RedditApiError::NotFound {
            resource: endpoint.to_string(),
        },
        429 => {
            let retry_after = headers
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|secs| secs.ceil() as u64)
                .unwrap_or(60);
            warn!("Rate limited on {}, Reddit asks for {}s", endpoint, retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => RedditApiError::UnexpectedStatus {
            status_code: code,
            endpoint: endpoint.to_string(),
        },
    };
    Some(error)
}

#[derive(Debug, Clone)]
pub struct RedditApiClient {
    http_client: Client,
    api_base: String,
}

impl RedditApiClient {
    /// `http_client` must already carry the bot's User-Agent.
    pub fn new(http_client: Client, api_base: impl Into<String>) -> Self {
        Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        form: Option<&[(&'static str, String)]>,
    ) -> Result<Response, RedditApiError> {
        let url = format!("{}{}", self.api_base, endpoint);

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token);

        if let Some(fields) = form {
            request_builder = request_builder.form(fields);
        }

        info!("Making Reddit API request: {} {}", method, endpoint);
        let response = request_builder.send().await.map_err(|e| {
            error!("Network error for {} {}: {}", method, endpoint, e);
            RedditApiError::Network(e)
        })?;

        if let Some(api_error) = classify_status(response.status(), response.headers(), endpoint) {
            error!(
                "Request failed with status: {} for {}",
                response.status(),
                endpoint
            );
            return Err(api_error);
        }

        debug!("Request successful: {} {}", response.status(), endpoint);
        Ok(response)
    }

    pub async fn get_user_info(
        &self,
        access_token: &str,
    ) -> Result<RedditUserData, RedditApiError> {
        let response = self
            .make_request(Method::GET, "/api/v1/me", access_token, None)
            .await?;

        let user_data: RedditUserData = response.json().await.map_err(|e| {
            error!("Failed to parse user data: {}", e);
            RedditApiError::InvalidResponse {
                details: "Failed to parse user data".to_string(),
            }
        })?;

        debug!("Retrieved user info for: {}", user_data.name);
        Ok(user_data)
    }

    pub async fn submit(
        &self,
        access_token: &str,
        request: &SubmitRequest,
    ) -> Result<PostResult, SubmissionError> {
        let api_error = |source: RedditApiError| SubmissionError::Api {
            subreddit: request.subreddit.clone(),
            source,
        };

        let fields = request.form_fields();
        let response = self
            .make_request(Method::POST, "/api/submit", access_token, Some(fields.as_slice()))
            .await
            .map_err(api_error)?;

        let submit_response: SubmitResponse = response.json().await.map_err(|e| {
            error!("Failed to parse submit response: {}", e);
            api_error(RedditApiError::InvalidResponse {
                details: format!("Failed to parse submit response for r/{}", request.subreddit),
            })
        })?;

        let result = submit_response.into_result(&request.subreddit)?;
        info!("Created post {} in r/{}", result.id, request.subreddit);
        Ok(result)
    }
}
