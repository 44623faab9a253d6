//! SQLite memory log implementation.
//!
//! Implements `MemoryRepository` from `squid-core`. Ordering uses the
//! AUTOINCREMENT id, which the single writer connection assigns in append
//! order; `created_at` is stamped at the same time and never disagrees with it
//! on a well-behaved clock. Windows are fetched newest-first and reversed.

use chrono::Utc;
use sqlx::Row;
use squid_core::memory::store::MemoryRepository;
use squid_types::error::RepositoryError;
use squid_types::memory::{
    ChannelCount, MemoryRecord, MemoryStats, MessageRole, NewMemoryRecord, RecordMetadata,
};
use tracing::warn;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err};

/// SQLite-backed implementation of `MemoryRepository`.
#[derive(Clone)]
pub struct SqliteMemoryRepository {
    pool: DatabasePool,
}

impl SqliteMemoryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct MemoryRow {
    id: i64,
    channel: String,
    role: String,
    content: String,
    metadata: Option<String>,
    created_at: String,
}

impl MemoryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            channel: row.try_get("channel")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_record(self) -> Result<MemoryRecord, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let metadata = self
            .metadata
            .as_deref()
            .and_then(|raw| decode_metadata(self.id, raw));

        Ok(MemoryRecord {
            id: self.id,
            channel: self.channel,
            role,
            content: self.content,
            metadata,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

/// Malformed metadata degrades to `None` for that record.
fn decode_metadata(record_id: i64, raw: &str) -> Option<RecordMetadata> {
    match serde_json::from_str::<RecordMetadata>(raw) {
        Ok(meta) => Some(meta),
        Err(e) => {
            warn!(record_id, error = %e, "Ignoring malformed memory metadata");
            None
        }
    }
}

fn rows_to_records(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<MemoryRecord>, RepositoryError> {
    rows.iter()
        .map(|row| MemoryRow::from_row(row).map_err(query_err)?.into_record())
        .collect()
}

/// Escape LIKE wildcards so the query is matched literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// ---------------------------------------------------------------------------
// MemoryRepository implementation
// ---------------------------------------------------------------------------

impl MemoryRepository for SqliteMemoryRepository {
    async fn append(&self, record: &NewMemoryRecord) -> Result<MemoryRecord, RepositoryError> {
        let channel = record.channel.trim();
        if channel.is_empty() {
            return Err(RepositoryError::InvalidInput(
                "channel must not be empty".to_string(),
            ));
        }

        let metadata = record
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let stamp = format_datetime(&Utc::now());

        let result = sqlx::query(
            "INSERT INTO memory (channel, role, content, metadata, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(channel)
        .bind(record.role.to_string())
        .bind(&record.content)
        .bind(metadata)
        .bind(&stamp)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(MemoryRecord {
            id: result.last_insert_rowid(),
            channel: channel.to_string(),
            role: record.role,
            content: record.content.clone(),
            metadata: record.metadata.clone(),
            created_at: parse_datetime(&stamp)?,
        })
    }

    async fn recent(&self, channel: &str, limit: u32) -> Result<Vec<MemoryRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, channel, role, content, metadata, created_at FROM memory \
             WHERE channel = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(channel)
        .bind(i64::from(limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut records = rows_to_records(&rows)?;
        records.reverse();
        Ok(records)
    }

    async fn recent_across_channels(&self, limit: u32) -> Result<Vec<MemoryRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, channel, role, content, metadata, created_at FROM memory \
             ORDER BY id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut records = rows_to_records(&rows)?;
        records.reverse();
        Ok(records)
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<MemoryRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, channel, role, content, metadata, created_at FROM memory \
             WHERE content LIKE ? ESCAPE '\\' ORDER BY id DESC LIMIT ?",
        )
        .bind(like_pattern(query))
        .bind(i64::from(limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        rows_to_records(&rows)
    }

    async fn purge(&self, channel: Option<&str>) -> Result<u64, RepositoryError> {
        let result = match channel {
            Some(channel) => {
                sqlx::query("DELETE FROM memory WHERE channel = ?")
                    .bind(channel)
                    .execute(&self.pool.writer)
                    .await
            }
            None => sqlx::query("DELETE FROM memory").execute(&self.pool.writer).await,
        }
        .map_err(query_err)?;

        warn!(channel = ?channel, deleted = result.rows_affected(), "Memory purged");
        Ok(result.rows_affected())
    }

    async fn stats(&self) -> Result<MemoryStats, RepositoryError> {
        let rows = sqlx::query(
            "SELECT channel, COUNT(*) AS count FROM memory GROUP BY channel ORDER BY channel",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut channels = Vec::with_capacity(rows.len());
        for row in &rows {
            let count: i64 = row.try_get("count").map_err(query_err)?;
            channels.push(ChannelCount {
                channel: row.try_get("channel").map_err(query_err)?,
                count: count as u64,
            });
        }
        let total = channels.iter().map(|c| c.count).sum();

        Ok(MemoryStats { total, channels })
    }
}
