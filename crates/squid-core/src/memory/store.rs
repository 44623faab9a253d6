//! MemoryRepository trait definition.
//!
//! The record log shared by every channel. Records are immutable once
//! appended; the only deletions are channel-scoped or full purges.

use squid_types::error::RepositoryError;
use squid_types::memory::{MemoryRecord, MemoryStats, NewMemoryRecord};

/// Repository trait for the cross-channel memory log.
///
/// Implementations live in squid-infra (e.g., `SqliteMemoryRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
///
/// Every `append` is durable before the returned future resolves. There is
/// no transaction spanning several calls.
pub trait MemoryRepository: Send + Sync {
    /// Persist one record. The store assigns `id` and `created_at`.
    fn append(
        &self,
        record: &NewMemoryRecord,
    ) -> impl std::future::Future<Output = Result<MemoryRecord, RepositoryError>> + Send;

    /// The `limit` most recent records on `channel`, oldest first.
    fn recent(
        &self,
        channel: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryRecord>, RepositoryError>> + Send;

    /// The `limit` most recent records on any channel, oldest first.
    fn recent_across_channels(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryRecord>, RepositoryError>> + Send;

    /// Records whose content contains `query` (ASCII case-insensitive),
    /// most recent first.
    fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryRecord>, RepositoryError>> + Send;

    /// Delete every record on `channel`, or every record when `None`.
    /// Returns the number of records removed.
    fn purge(
        &self,
        channel: Option<&str>,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Total and per-channel record counts.
    fn stats(&self) -> impl std::future::Future<Output = Result<MemoryStats, RepositoryError>> + Send;
}
