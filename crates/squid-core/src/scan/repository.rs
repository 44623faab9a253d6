//! ScanRepository trait definition.

use squid_types::error::RepositoryError;
use squid_types::scan::{ScanRecord, TriggerType};

/// Persistence for recorded scans. Scans are insert-only.
///
/// Implementations live in squid-infra (e.g., `SqliteScanRepository`).
pub trait ScanRepository: Send + Sync {
    /// Insert a fully derived scan record.
    fn insert(
        &self,
        scan: &ScanRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The scan with the greatest `scanned_at`, ties broken by insertion order.
    fn latest(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<ScanRecord>, RepositoryError>> + Send;

    /// Most recent first.
    fn history(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<ScanRecord>, RepositoryError>> + Send;

    fn count_by_trigger(
        &self,
        trigger: TriggerType,
    ) -> impl std::future::Future<Output = Result<u32, RepositoryError>> + Send;
}
