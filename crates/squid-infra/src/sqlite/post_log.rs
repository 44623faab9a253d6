//! SQLite post log implementation.

use chrono::Utc;
use sqlx::Row;
use squid_core::post::PostLogRepository;
use squid_types::error::RepositoryError;
use squid_types::post::{NewPostLogEntry, PostLogEntry, PostStatus};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err};

#[derive(Clone)]
pub struct SqlitePostLogRepository {
    pool: DatabasePool,
}

impl SqlitePostLogRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct PostRow {
    id: i64,
    channel: String,
    content: String,
    post_id: Option<String>,
    status: String,
    created_at: String,
}

impl PostRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            channel: row.try_get("channel")?,
            content: row.try_get("content")?,
            post_id: row.try_get("post_id")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_entry(self) -> Result<PostLogEntry, RepositoryError> {
        Ok(PostLogEntry {
            id: self.id,
            channel: self.channel,
            content: self.content,
            post_id: self.post_id,
            status: self
                .status
                .parse::<PostStatus>()
                .map_err(RepositoryError::Query)?,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl PostLogRepository for SqlitePostLogRepository {
    async fn log(&self, entry: &NewPostLogEntry) -> Result<PostLogEntry, RepositoryError> {
        let stamp = format_datetime(&Utc::now());

        let result = sqlx::query(
            "INSERT INTO post_log (channel, content, post_id, status, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.channel)
        .bind(&entry.content)
        .bind(&entry.post_id)
        .bind(entry.status.to_string())
        .bind(&stamp)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(PostLogEntry {
            id: result.last_insert_rowid(),
            channel: entry.channel.clone(),
            content: entry.content.clone(),
            post_id: entry.post_id.clone(),
            status: entry.status,
            created_at: parse_datetime(&stamp)?,
        })
    }

    async fn recent(
        &self,
        channel: Option<&str>,
        limit: u32,
    ) -> Result<Vec<PostLogEntry>, RepositoryError> {
        let rows = match channel {
            Some(channel) => {
                sqlx::query(
                    "SELECT id, channel, content, post_id, status, created_at FROM post_log \
                     WHERE channel = ? ORDER BY id DESC LIMIT ?",
                )
                .bind(channel)
                .bind(limit)
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, channel, content, post_id, status, created_at FROM post_log \
                     ORDER BY id DESC LIMIT ?",
                )
                .bind(limit)
                .fetch_all(&self.pool.reader)
                .await
            }
        }
        .map_err(query_err)?;

        rows.iter()
            .map(|row| PostRow::from_row(row).map_err(query_err)?.into_entry())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;

    fn entry(channel: &str, content: &str, status: PostStatus) -> NewPostLogEntry {
        NewPostLogEntry {
            channel: channel.into(),
            content: content.into(),
            post_id: (status == PostStatus::Posted).then(|| format!("{channel}-1")),
            status,
        }
    }

    #[tokio::test]
    async fn test_log_returns_stored_entry() {
        let repo = SqlitePostLogRepository::new(test_pool().await);

        let logged = repo.log(&entry("x", "gm", PostStatus::Posted)).await.unwrap();
        assert!(logged.id > 0);
        assert_eq!(logged.post_id.as_deref(), Some("x-1"));

        let recent = repo.recent(None, 10).await.unwrap();
        assert_eq!(recent, vec![logged]);
    }

    #[tokio::test]
    async fn test_recent_filters_by_channel_newest_first() {
        let repo = SqlitePostLogRepository::new(test_pool().await);
        repo.log(&entry("x", "one", PostStatus::Posted)).await.unwrap();
        repo.log(&entry("moltbook", "two", PostStatus::Failed)).await.unwrap();
        repo.log(&entry("x", "three", PostStatus::Posted)).await.unwrap();

        let x: Vec<String> = repo
            .recent(Some("x"), 10)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.content)
            .collect();
        assert_eq!(x, vec!["three", "one"]);

        let all = repo.recent(None, 2).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].status, PostStatus::Failed);
        assert!(all[1].post_id.is_none());
    }
}
