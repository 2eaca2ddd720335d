use phaws_core::{
    AuthenticationError, BotConfig, ContentPool, ContentSelector, CoreError, PostPayload,
    PostResult, SubmissionError,
};
use reddit_client::{RedditSession, SessionConnector, SubmitRequest};
use std::time::Duration;
use tracing::{error, info};

/// Fixed pause before a run so externally co-triggered launches don't hit
/// Reddit at the same instant.
pub const STARTUP_DELAY: Duration = Duration::from_secs(2);

/// Authenticates and verifies the session belongs to the configured account.
/// No session is returned unless the identity check passed.
pub async fn build_client<C: SessionConnector>(
    connector: &C,
    config: &BotConfig,
) -> Result<C::Session, AuthenticationError> {
    let session = connector
        .connect(&config.credentials, &config.user_agent)
        .await?;

    let me = session
        .me()
        .await
        .map_err(AuthenticationError::IdentityCheckFailed)?;

    if !me.name.eq_ignore_ascii_case(&config.credentials.username) {
        return Err(AuthenticationError::IdentityMismatch {
            expected: config.credentials.username.clone(),
            actual: me.name,
        });
    }

    info!("Authenticated as u/{}", me.name);
    Ok(session)
}

pub async fn submit<S: RedditSession + ?Sized>(
    session: &S,
    subreddit_name: &str,
    payload: &PostPayload,
) -> Result<PostResult, SubmissionError> {
    let request = SubmitRequest::new(subreddit_name, payload);
    session.submit(&request).await
}

/// Resolves the run's content pool: the file named by the config, or the
/// built-in pool.
pub fn load_pool(config: &BotConfig) -> Result<ContentPool, CoreError> {
    match &config.content_pool_path {
        Some(path) => Ok(ContentPool::load(path)?),
        None => Ok(ContentPool::builtin()),
    }
}

pub fn build_selector(
    config: &BotConfig,
    pool: ContentPool,
) -> Result<ContentSelector, CoreError> {
    Ok(ContentSelector::new(
        pool,
        config.target_subreddits.clone(),
        config.experiment_tag.clone(),
    )?)
}

pub struct PostService<C> {
    connector: C,
}

impl<C: SessionConnector> PostService<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// One complete run: authenticate, pick a target and a payload, post it.
    pub async fn run(
        &self,
        config: &BotConfig,
        selector: &mut ContentSelector,
    ) -> Result<PostResult, CoreError> {
        let session = match build_client(&self.connector, config).await {
            Ok(session) => session,
            Err(e) => {
                error!("[bot] ERROR during Reddit auth: {}", e);
                return Err(e.into());
            }
        };

        let subreddit_name = selector.choose_subreddit().to_string();
        let payload = selector.choose_payload();

        info!("[bot] Target subreddit: r/{}", subreddit_name);
        info!("[bot] Title: {:?}", payload.title);

        let result = submit(&session, &subreddit_name, &payload).await?;
        info!("[bot] Submitted post: {}", result.full_url());
        Ok(result)
    }
}
