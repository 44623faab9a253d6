//! Post log: audit trail of content published to external channels.
//!
//! A successful post is also remembered as an assistant turn on its channel,
//! so later conversations can refer to what the agent published.

use squid_types::error::RepositoryError;
use squid_types::memory::{MessageRole, NewMemoryRecord, RecordMetadata};
use squid_types::post::{NewPostLogEntry, PostLogEntry, PostStatus};
use tracing::{info, warn};

use crate::memory::store::MemoryRepository;

/// Append-only post log persistence.
pub trait PostLogRepository: Send + Sync {
    fn log(
        &self,
        entry: &NewPostLogEntry,
    ) -> impl std::future::Future<Output = Result<PostLogEntry, RepositoryError>> + Send;

    /// Most recent first, optionally limited to one channel.
    fn recent(
        &self,
        channel: Option<&str>,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<PostLogEntry>, RepositoryError>> + Send;
}

pub struct PostRecorder<P: PostLogRepository, M: MemoryRepository> {
    posts: P,
    memory: M,
}

impl<P: PostLogRepository, M: MemoryRepository> PostRecorder<P, M> {
    pub fn new(posts: P, memory: M) -> Self {
        Self { posts, memory }
    }

    /// Remember a published post and add it to the post log.
    pub async fn record_published(
        &self,
        channel: &str,
        content: &str,
        post_id: Option<String>,
        scheduled: bool,
    ) -> Result<PostLogEntry, RepositoryError> {
        let metadata = RecordMetadata {
            post_id: post_id.clone(),
            scheduled: scheduled.then_some(true),
            ..RecordMetadata::default()
        };
        self.memory
            .append(
                &NewMemoryRecord::new(channel, MessageRole::Assistant, content)
                    .with_metadata(metadata),
            )
            .await?;

        let entry = self
            .posts
            .log(&NewPostLogEntry {
                channel: channel.to_string(),
                content: content.to_string(),
                post_id,
                status: PostStatus::Posted,
            })
            .await?;
        info!(channel, post_id = ?entry.post_id, scheduled, "Post recorded");
        Ok(entry)
    }

    /// Log a failed publish attempt. Nothing is added to memory.
    pub async fn record_failed(
        &self,
        channel: &str,
        content: &str,
    ) -> Result<PostLogEntry, RepositoryError> {
        warn!(channel, "Post failed to publish");
        self.posts
            .log(&NewPostLogEntry {
                channel: channel.to_string(),
                content: content.to_string(),
                post_id: None,
                status: PostStatus::Failed,
            })
            .await
    }

    pub async fn recent(
        &self,
        channel: Option<&str>,
        limit: u32,
    ) -> Result<Vec<PostLogEntry>, RepositoryError> {
        self.posts.recent(channel, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryMemoryRepository, InMemoryPostLog};

    #[tokio::test]
    async fn test_published_post_is_remembered() {
        let memory = InMemoryMemoryRepository::default();
        let recorder = PostRecorder::new(InMemoryPostLog::default(), memory.clone());

        let entry = recorder
            .record_published("moltbook", "hello agents", Some("p-1".into()), true)
            .await
            .unwrap();

        assert_eq!(entry.status, PostStatus::Posted);
        let records = memory.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].role, MessageRole::Assistant);
        let meta = records[0].metadata.as_ref().unwrap();
        assert_eq!(meta.post_id.as_deref(), Some("p-1"));
        assert_eq!(meta.scheduled, Some(true));
        assert!(!meta.has_token_counts());
    }

    #[tokio::test]
    async fn test_failed_post_is_logged_only() {
        let memory = InMemoryMemoryRepository::default();
        let recorder = PostRecorder::new(InMemoryPostLog::default(), memory.clone());

        recorder.record_failed("x", "too long").await.unwrap();
        recorder
            .record_published("moltbook", "ok", None, false)
            .await
            .unwrap();

        assert_eq!(memory.all().len(), 1);
        let x_posts = recorder.recent(Some("x"), 10).await.unwrap();
        assert_eq!(x_posts.len(), 1);
        assert_eq!(x_posts[0].status, PostStatus::Failed);
        assert_eq!(recorder.recent(None, 10).await.unwrap()[0].channel, "moltbook");
    }
}
