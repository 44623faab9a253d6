//! Post log types: the audit trail of content published to external channels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Posted,
    Failed,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Posted => write!(f, "posted"),
            PostStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "posted" => Ok(PostStatus::Posted),
            "failed" => Ok(PostStatus::Failed),
            other => Err(format!("invalid post status: '{other}'")),
        }
    }
}

/// One published (or attempted) post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostLogEntry {
    pub id: i64,
    pub channel: String,
    pub content: String,
    pub post_id: Option<String>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for appending to the post log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPostLogEntry {
    pub channel: String,
    pub content: String,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
}
