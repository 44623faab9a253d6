//! Memory types for the squid agent.
//!
//! Every turn said to or by the agent, on any channel, is one immutable
//! [`MemoryRecord`] in a single shared log. Channels are open-ended strings
//! ("chat", "sms", "x", "moltbook", "a2a", ...) so new surfaces need no
//! schema change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::llm::MessageRole;

/// The agent's primary interactive surface.
pub const PRIMARY_CHANNEL: &str = "chat";

/// Current version of the [`RecordMetadata`] payload.
pub const METADATA_VERSION: u32 = 1;

/// One conversational turn persisted in the memory log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Store-assigned, strictly increasing.
    pub id: i64,
    pub channel: String,
    pub role: MessageRole,
    pub content: String,
    /// `None` both when nothing was attached and when the stored payload
    /// failed validation on read.
    pub metadata: Option<RecordMetadata>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending a record. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewMemoryRecord {
    pub channel: String,
    pub role: MessageRole,
    pub content: String,
    pub metadata: Option<RecordMetadata>,
}

impl NewMemoryRecord {
    pub fn new(channel: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            role,
            content: content.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: RecordMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Structured attachment on a memory record.
///
/// Known fields are typed; anything else a producer attaches is kept in
/// `extra` so nested structure survives the round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(default = "default_metadata_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    /// Identifier the external platform assigned to a published post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    /// Sender identity for agent-to-agent messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_metadata_version() -> u32 {
    METADATA_VERSION
}

impl Default for RecordMetadata {
    fn default() -> Self {
        Self {
            version: METADATA_VERSION,
            model: None,
            input_tokens: None,
            output_tokens: None,
            stop_reason: None,
            post_id: None,
            from_agent: None,
            scheduled: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl RecordMetadata {
    /// Metadata describing a model completion.
    pub fn completion(
        model: impl Into<String>,
        input_tokens: u64,
        output_tokens: u64,
        stop_reason: impl Into<String>,
    ) -> Self {
        Self {
            version: METADATA_VERSION,
            model: Some(model.into()),
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
            stop_reason: Some(stop_reason.into()),
            ..Self::default()
        }
    }

    /// Whether either token counter is present.
    pub fn has_token_counts(&self) -> bool {
        self.input_tokens.is_some() || self.output_tokens.is_some()
    }
}

/// Record count for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCount {
    pub channel: String,
    pub count: u64,
}

/// Aggregate counts over the memory log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total: u64,
    /// Sorted by channel name.
    pub channels: Vec<ChannelCount>,
}

/// Cumulative token usage derived from assistant records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub assistant_message_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_preserves_unknown_nested_fields() {
        let raw = json!({
            "input_tokens": 12,
            "thread": {"parent": "abc", "depth": [1, 2]}
        });
        let meta: RecordMetadata = serde_json::from_value(raw).unwrap();
        assert_eq!(meta.version, METADATA_VERSION);
        assert_eq!(meta.input_tokens, Some(12));
        assert_eq!(meta.extra["thread"]["depth"][1], 2);

        let back = serde_json::to_value(&meta).unwrap();
        assert_eq!(back["thread"]["parent"], "abc");
        assert!(back.get("output_tokens").is_none());
    }

    #[test]
    fn test_completion_metadata_has_token_counts() {
        let meta = RecordMetadata::completion("claude", 10, 20, "end_turn");
        assert!(meta.has_token_counts());
        assert!(!RecordMetadata::default().has_token_counts());
    }

    #[test]
    fn test_usage_stats_serializes_camel_case() {
        let stats = UsageStats {
            total_input_tokens: 1,
            total_output_tokens: 2,
            assistant_message_count: 3,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(
            json,
            json!({"totalInputTokens": 1, "totalOutputTokens": 2, "assistantMessageCount": 3})
        );
    }

    #[test]
    fn test_memory_record_role_is_lowercase() {
        let record = MemoryRecord {
            id: 1,
            channel: "sms".to_string(),
            role: MessageRole::Assistant,
            content: "hello".to_string(),
            metadata: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json["metadata"].is_null());
    }
}
