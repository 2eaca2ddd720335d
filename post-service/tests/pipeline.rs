use async_trait::async_trait;
use phaws_core::{
    AuthenticationError, BotConfig, ConfigError, ContentPool, CoreError, PostKind, PostPayload,
    PostResult, RedditApiError, RedditCredentials, SubmissionError,
};
use post_service::{build_client, build_selector, load_pool, submit, PostService};
use reddit_client::{RedditSession, RedditUserData, SessionConnector, SubmitRequest};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Call {
    Connect,
    IdentityCheck,
    Submit,
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
    submits: Vec<SubmitRequest>,
}

#[derive(Clone, Copy)]
enum Identity {
    Account(&'static str),
    Fails,
}

#[derive(Clone, Copy)]
enum Outcome {
    Accept,
    Reject,
}

struct StubConnector {
    recorder: Arc<Mutex<Recorder>>,
    connect_fails: bool,
    identity: Identity,
    outcome: Outcome,
}

impl StubConnector {
    fn new(identity: Identity, outcome: Outcome) -> Self {
        Self {
            recorder: Arc::new(Mutex::new(Recorder::default())),
            connect_fails: false,
            identity,
            outcome,
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.recorder.lock().unwrap().calls.clone()
    }

    fn submits(&self) -> Vec<SubmitRequest> {
        self.recorder.lock().unwrap().submits.clone()
    }
}

struct StubSession {
    recorder: Arc<Mutex<Recorder>>,
    identity: Identity,
    outcome: Outcome,
}

#[async_trait]
impl SessionConnector for StubConnector {
    type Session = StubSession;

    async fn connect(
        &self,
        _credentials: &RedditCredentials,
        _user_agent: &str,
    ) -> Result<StubSession, AuthenticationError> {
        self.recorder.lock().unwrap().calls.push(Call::Connect);
        if self.connect_fails {
            return Err(AuthenticationError::TokenExchangeFailed {
                reason: "invalid_grant".to_string(),
            });
        }
        Ok(StubSession {
            recorder: Arc::clone(&self.recorder),
            identity: self.identity,
            outcome: self.outcome,
        })
    }
}

#[async_trait]
impl RedditSession for StubSession {
    async fn me(&self) -> Result<RedditUserData, RedditApiError> {
        self.recorder.lock().unwrap().calls.push(Call::IdentityCheck);
        match self.identity {
            Identity::Account(name) => Ok(RedditUserData {
                id: "1a2b3c".to_string(),
                name: name.to_string(),
                created_utc: 1640995200.0,
                link_karma: 1,
                comment_karma: 1,
                has_verified_email: Some(true),
            }),
            Identity::Fails => Err(RedditApiError::InvalidToken),
        }
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<PostResult, SubmissionError> {
        let mut recorder = self.recorder.lock().unwrap();
        recorder.calls.push(Call::Submit);
        recorder.submits.push(request.clone());
        match self.outcome {
            Outcome::Accept => Ok(PostResult {
                id: "abc123".to_string(),
                permalink: format!("/r/{}/comments/abc123/post/", request.subreddit),
            }),
            Outcome::Reject => Err(SubmissionError::Rejected {
                subreddit: request.subreddit.clone(),
                reason: "SUBREDDIT_NOTALLOWED: you aren't allowed to post there.".to_string(),
            }),
        }
    }
}

fn config_with(extra: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
    let mut vars: HashMap<String, String> = [
        ("REDDIT_CLIENT_ID", "id"),
        ("REDDIT_CLIENT_SECRET", "secret"),
        ("REDDIT_USERNAME", "phaws_bot"),
        ("REDDIT_PASSWORD", "hunter2"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    BotConfig::from_lookup(move |name| vars.get(name).cloned())
}

fn builtin_titles() -> Vec<String> {
    ContentPool::builtin()
        .posts()
        .iter()
        .map(|p| p.title.clone())
        .collect()
}

#[tokio::test]
async fn test_end_to_end_single_submission() {
    let config = config_with(&[("REDDIT_TARGET_SUBREDDITS", "x,y")]).unwrap();
    let connector = StubConnector::new(Identity::Account("phaws_bot"), Outcome::Accept);
    let service = PostService::new(connector);

    let pool = load_pool(&config).unwrap();
    let mut selector = build_selector(&config, pool)
        .unwrap()
        .with_rng(fastrand::Rng::with_seed(2024));

    let result = service.run(&config, &mut selector).await.unwrap();

    let connector = service_connector(&service);
    assert_eq!(
        connector.calls(),
        vec![Call::Connect, Call::IdentityCheck, Call::Submit]
    );

    let submits = connector.submits();
    assert_eq!(submits.len(), 1);
    let request = &submits[0];
    assert!(request.subreddit == "x" || request.subreddit == "y");
    assert!(builtin_titles().contains(&request.title));
    assert!(matches!(request.kind, PostKind::SelfText { .. }));
    assert_eq!(
        result.full_url(),
        format!("https://reddit.com/r/{}/comments/abc123/post/", request.subreddit)
    );
}

#[tokio::test]
async fn test_experiment_tag_reaches_submission() {
    let config = config_with(&[
        ("REDDIT_TARGET_SUBREDDITS", "x,y"),
        ("PHAWS_EXPERIMENT_TAG", "exp-42"),
    ])
    .unwrap();
    let service = PostService::new(StubConnector::new(
        Identity::Account("phaws_bot"),
        Outcome::Accept,
    ));
    let mut selector = build_selector(&config, ContentPool::builtin())
        .unwrap()
        .with_rng(fastrand::Rng::with_seed(9));

    service.run(&config, &mut selector).await.unwrap();

    let submits = service_connector(&service).submits();
    let title = &submits[0].title;
    assert!(builtin_titles()
        .iter()
        .any(|t| *title == format!("{} [exp-42]", t)));
}

#[tokio::test]
async fn test_identity_failure_prevents_submission() {
    let config = config_with(&[]).unwrap();
    let service = PostService::new(StubConnector::new(Identity::Fails, Outcome::Accept));
    let mut selector = build_selector(&config, ContentPool::builtin()).unwrap();

    let result = service.run(&config, &mut selector).await;
    assert!(matches!(
        result,
        Err(CoreError::Authentication(
            AuthenticationError::IdentityCheckFailed(RedditApiError::InvalidToken)
        ))
    ));

    let connector = service_connector(&service);
    assert_eq!(connector.calls(), vec![Call::Connect, Call::IdentityCheck]);
    assert!(connector.submits().is_empty());
}

#[tokio::test]
async fn test_identity_mismatch_prevents_submission() {
    let config = config_with(&[]).unwrap();
    let connector = StubConnector::new(Identity::Account("someone_else"), Outcome::Accept);

    let result = build_client(&connector, &config).await;
    match result {
        Err(AuthenticationError::IdentityMismatch { expected, actual }) => {
            assert_eq!(expected, "phaws_bot");
            assert_eq!(actual, "someone_else");
        }
        Err(other) => panic!("Expected identity mismatch, got {:?}", other),
        Ok(_) => panic!("Expected identity mismatch, got a session"),
    }
    assert!(connector.submits().is_empty());
}

#[tokio::test]
async fn test_identity_match_ignores_case() {
    let config = config_with(&[]).unwrap();
    let connector = StubConnector::new(Identity::Account("Phaws_Bot"), Outcome::Accept);
    assert!(build_client(&connector, &config).await.is_ok());
}

#[tokio::test]
async fn test_token_exchange_failure_skips_identity_check() {
    let config = config_with(&[]).unwrap();
    let mut connector = StubConnector::new(Identity::Account("phaws_bot"), Outcome::Accept);
    connector.connect_fails = true;

    let result = build_client(&connector, &config).await;
    assert!(matches!(
        result,
        Err(AuthenticationError::TokenExchangeFailed { .. })
    ));
    assert_eq!(connector.calls(), vec![Call::Connect]);
}

#[test]
fn test_missing_credential_stops_before_network() {
    let connector = StubConnector::new(Identity::Account("phaws_bot"), Outcome::Accept);

    let mut vars: HashMap<&str, &str> = HashMap::new();
    vars.insert("REDDIT_CLIENT_ID", "id");
    vars.insert("REDDIT_CLIENT_SECRET", "secret");
    vars.insert("REDDIT_USERNAME", "phaws_bot");
    let result = BotConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

    match result {
        Err(ConfigError::MissingEnvironmentVariable { var_name }) => {
            assert_eq!(var_name, "REDDIT_PASSWORD")
        }
        other => panic!("Expected missing REDDIT_PASSWORD, got {:?}", other),
    }
    assert!(connector.calls().is_empty());
}

#[tokio::test]
async fn test_rejection_propagates() {
    let config = config_with(&[("REDDIT_TARGET_SUBREDDITS", "locked")]).unwrap();
    let service = PostService::new(StubConnector::new(
        Identity::Account("phaws_bot"),
        Outcome::Reject,
    ));
    let mut selector = build_selector(&config, ContentPool::builtin()).unwrap();

    let result = service.run(&config, &mut selector).await;
    match result {
        Err(CoreError::Submission(SubmissionError::Rejected { subreddit, .. })) => {
            assert_eq!(subreddit, "locked")
        }
        other => panic!("Expected rejection, got {:?}", other),
    }
    assert_eq!(service_connector(&service).submits().len(), 1);
}

#[test]
fn test_submit_text_and_link_posts() {
    let connector = StubConnector::new(Identity::Account("phaws_bot"), Outcome::Accept);
    let config = config_with(&[]).unwrap();
    let session = tokio_test::block_on(build_client(&connector, &config)).unwrap();

    let text = PostPayload::text("Text", "Body");
    tokio_test::block_on(submit(&session, "rust", &text)).unwrap();

    let both = PostPayload {
        title: "Both".to_string(),
        selftext: Some("dropped".to_string()),
        url: Some("https://example.com".to_string()),
    };
    tokio_test::block_on(submit(&session, "rust", &both)).unwrap();

    let submits = connector.submits();
    assert_eq!(
        submits[0].kind,
        PostKind::SelfText {
            text: "Body".to_string()
        }
    );
    assert_eq!(
        submits[1].kind,
        PostKind::Link {
            url: "https://example.com".to_string()
        }
    );
}

#[test]
fn test_load_pool_from_missing_file() {
    let config = config_with(&[("PHAWS_CONTENT_POOL", "/nonexistent/phaws/pool.toml")]).unwrap();
    let result = load_pool(&config);
    assert!(matches!(
        result,
        Err(CoreError::Config(ConfigError::ContentPoolUnreadable { .. }))
    ));
}

fn service_connector(service: &PostService<StubConnector>) -> &StubConnector {
    service.connector()
}
