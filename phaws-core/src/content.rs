use crate::error::ConfigError;
use crate::types::PostPayload;
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The fixed list of payloads a run may pick from. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContentPool")]
pub struct ContentPool {
    posts: Vec<PostPayload>,
}

// Unvalidated file shape; deserializing a `ContentPool` goes through `new`.
#[derive(Deserialize)]
struct RawContentPool {
    posts: Vec<PostPayload>,
}

impl TryFrom<RawContentPool> for ContentPool {
    type Error = ConfigError;

    fn try_from(raw: RawContentPool) -> Result<Self, Self::Error> {
        Self::new(raw.posts)
    }
}

impl ContentPool {
    pub fn new(posts: Vec<PostPayload>) -> Result<Self, ConfigError> {
        if posts.is_empty() {
            return Err(ConfigError::EmptyContentPool);
        }
        if let Some(untitled) = posts.iter().position(|p| p.title.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("posts[{}].title", untitled),
                value: String::new(),
            });
        }
        Ok(Self { posts })
    }

    pub fn builtin() -> Self {
        Self {
            posts: vec![
                PostPayload::text(
                    "What are your favorite underrated AI research directions right now?",
                    "Everyone talks about ever-bigger LLMs, but I'm curious about the \
                     more niche or overlooked areas.\n\n\
                     What are you working on or quietly bullish on that almost nobody \
                     else around you is talking about?",
                ),
                PostPayload::text(
                    "Show me your most practical AI workflow that saves you real hours",
                    "Not demos, not hype \u{2014} the boring-but-powerful stuff.\n\n\
                     What AI workflow actually saves you hours every week, and how \
                     did you wire it together?",
                ),
                PostPayload::text(
                    "LLMs as teammates, not tools: how are you structuring that?",
                    "If you treat models as persistent collaborators, not just chat boxes, \
                     how are you setting up memory, task queues, and guardrails right now?",
                ),
            ],
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let parsed: RawContentPool = toml::from_str(raw)?;
        Self::new(parsed.posts)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ContentPoolUnreadable {
                path: path.display().to_string(),
                source,
            })?;
        let pool = Self::from_toml_str(&raw)?;
        debug!("Loaded {} posts from {}", pool.len(), path.display());
        Ok(pool)
    }

    pub fn posts(&self) -> &[PostPayload] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Uniform random choice of target subreddit and payload.
#[derive(Debug)]
pub struct ContentSelector {
    pool: ContentPool,
    subreddits: Vec<String>,
    experiment_tag: Option<String>,
    rng: Rng,
}

impl ContentSelector {
    pub fn new(
        pool: ContentPool,
        subreddits: Vec<String>,
        experiment_tag: Option<String>,
    ) -> Result<Self, ConfigError> {
        if subreddits.is_empty() {
            return Err(ConfigError::EmptySubredditList);
        }
        let experiment_tag = experiment_tag
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty());

        Ok(Self {
            pool,
            subreddits,
            experiment_tag,
            rng: Rng::new(),
        })
    }

    pub fn with_rng(mut self, rng: Rng) -> Self {
        self.rng = rng;
        self
    }

    pub fn pool(&self) -> &ContentPool {
        &self.pool
    }

    pub fn subreddits(&self) -> &[String] {
        &self.subreddits
    }

    pub fn choose_subreddit(&mut self) -> &str {
        let index = self.rng.usize(..self.subreddits.len());
        &self.subreddits[index]
    }

    /// Returns a copy of a random pool entry, with the experiment tag appended
    /// to its title when one is configured.
    pub fn choose_payload(&mut self) -> PostPayload {
        let index = self.rng.usize(..self.pool.len());
        let mut payload = self.pool.posts[index].clone();
        if let Some(tag) = &self.experiment_tag {
            payload.title = format!("{} [{}]", payload.title, tag);
        }
        payload
    }
}
