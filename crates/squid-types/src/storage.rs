//! Key-value store types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A key-value entry in the agent's persistent settings store.
///
/// `value` is the decoded form: structured JSON when the stored text parses,
/// otherwise the raw text as a JSON string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
