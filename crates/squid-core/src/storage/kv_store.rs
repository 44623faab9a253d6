//! Key-value store trait.
//!
//! Defines the interface for the agent's settings store.
//! Implementations live in squid-infra.

use serde_json::Value;
use squid_types::error::RepositoryError;
use squid_types::storage::KvEntry;

/// Trait for agent-level key-value persistent storage.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in squid-infra.
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Value>, RepositoryError>> + Send;

    /// Set a value for a key (upsert). Value and timestamp change together.
    fn set(
        &self,
        key: &str,
        value: &Value,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List all entries ordered by key.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<KvEntry>, RepositoryError>> + Send;
}

/// Encode a value for storage: strings verbatim, anything else as JSON.
pub fn encode_value(value: &Value) -> Result<String, RepositoryError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serde_json::to_string(other)
            .map_err(|e| RepositoryError::Serialization(e.to_string())),
    }
}

/// Decode stored text: parsed JSON when it parses, otherwise the raw string.
pub fn decode_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_stored_verbatim() {
        assert_eq!(encode_value(&json!("dark")).unwrap(), "dark");
        assert_eq!(decode_value("dark".to_string()), json!("dark"));
    }

    #[test]
    fn test_structured_value_survives() {
        let value = json!({"a": 1, "nested": [true, null]});
        let stored = encode_value(&value).unwrap();
        assert_eq!(decode_value(stored), value);
    }

    #[test]
    fn test_numeric_looking_string_decodes_as_number() {
        // Strings are stored verbatim, so "42" reads back as the number 42.
        let stored = encode_value(&json!("42")).unwrap();
        assert_eq!(decode_value(stored), json!(42));
    }
}
