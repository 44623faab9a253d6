//! Scanner trait: the external security scanning service.

use serde::Serialize;
use squid_types::error::ScanError;
use squid_types::scan::NewScan;

/// Identifies what to scan and who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRequest {
    pub repo: String,
    pub agent_id: Option<String>,
    pub agent_name: String,
}

/// A remote scanner. Returns the outcome without `id`/`trust_score`
/// guarantees; the ledger fills those in.
pub trait Scanner: Send + Sync {
    fn scan(
        &self,
        request: &ScanRequest,
    ) -> impl std::future::Future<Output = Result<NewScan, ScanError>> + Send;
}
