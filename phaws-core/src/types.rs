use serde::{Deserialize, Serialize};

pub const REDDIT_WEB_BASE: &str = "https://reddit.com";

/// One candidate post: a title plus either body text or a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPayload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selftext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PostPayload {
    pub fn text(title: impl Into<String>, selftext: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            selftext: Some(selftext.into()),
            url: None,
        }
    }

    pub fn link(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            selftext: None,
            url: Some(url.into()),
        }
    }

    /// Resolves how this payload is submitted. A non-blank `url` always wins,
    /// so body text next to a url is dropped. A blank `url` counts as absent.
    pub fn kind(&self) -> PostKind {
        let url = self.url.as_deref().filter(|url| !url.trim().is_empty());
        match url {
            Some(url) => PostKind::Link {
                url: url.to_string(),
            },
            None => PostKind::SelfText {
                text: self.selftext.clone().unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostKind {
    Link { url: String },
    SelfText { text: String },
}

impl PostKind {
    /// Value of the `kind` form field on `/api/submit`.
    pub fn as_api_kind(&self) -> &'static str {
        match self {
            PostKind::Link { .. } => "link",
            PostKind::SelfText { .. } => "self",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostResult {
    pub id: String,
    /// Site-relative path, e.g. `/r/rust/comments/abc123/title/`.
    pub permalink: String,
}

impl PostResult {
    pub fn full_url(&self) -> String {
        format!("{}{}", REDDIT_WEB_BASE, self.permalink)
    }
}
