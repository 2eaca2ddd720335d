use crate::error::ConfigError;
use std::fmt;
use std::path::PathBuf;

pub const ENV_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_USERNAME: &str = "REDDIT_USERNAME";
pub const ENV_PASSWORD: &str = "REDDIT_PASSWORD";
pub const ENV_USER_AGENT: &str = "REDDIT_USER_AGENT";
pub const ENV_TARGET_SUBREDDITS: &str = "REDDIT_TARGET_SUBREDDITS";
pub const ENV_EXPERIMENT_TAG: &str = "PHAWS_EXPERIMENT_TAG";
pub const ENV_CONTENT_POOL: &str = "PHAWS_CONTENT_POOL";

pub const DEFAULT_TARGET_SUBREDDITS: &str =
    "Artificial,LocalLLaMA,MachineLearning,ChatGPT,DataIsBeautiful";

#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub credentials: RedditCredentials,
    pub user_agent: String,
    pub target_subreddits: Vec<String>,
    pub experiment_tag: Option<String>,
    pub content_pool_path: Option<PathBuf>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any key lookup. Required credentials are
    /// resolved first so a missing one is reported before anything else.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = RedditCredentials {
            client_id: get_env(&lookup, ENV_CLIENT_ID, None, true)?,
            client_secret: get_env(&lookup, ENV_CLIENT_SECRET, None, true)?,
            username: get_env(&lookup, ENV_USERNAME, None, true)?,
            password: get_env(&lookup, ENV_PASSWORD, None, true)?,
        };

        let default_agent = format!("phaws-reddit-bot/0.1 by u/{}", credentials.username);
        let user_agent = get_env(&lookup, ENV_USER_AGENT, Some(&default_agent), false)?;

        let raw_targets = get_env(
            &lookup,
            ENV_TARGET_SUBREDDITS,
            Some(DEFAULT_TARGET_SUBREDDITS),
            false,
        )?;
        let target_subreddits = parse_subreddit_list(&raw_targets);
        if target_subreddits.is_empty() {
            return Err(ConfigError::EmptySubredditList);
        }

        let experiment_tag = Some(get_env(&lookup, ENV_EXPERIMENT_TAG, Some(""), false)?)
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty());

        let content_pool_path = Some(get_env(&lookup, ENV_CONTENT_POOL, Some(""), false)?)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            credentials,
            user_agent,
            target_subreddits,
            experiment_tag,
            content_pool_path,
        })
    }
}

/// Resolves `name` through `lookup`, falling back to `default` when the value
/// is absent or blank. Fails only when `required` and nothing resolved.
pub fn get_env<F>(
    lookup: &F,
    name: &str,
    default: Option<&str>,
    required: bool,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name)
        .filter(|v| !v.trim().is_empty())
        .or_else(|| default.map(str::to_string))
        .unwrap_or_default();

    if required && value.trim().is_empty() {
        return Err(ConfigError::MissingEnvironmentVariable {
            var_name: name.to_string(),
        });
    }

    Ok(value)
}

pub fn parse_subreddit_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
