//! Token usage accounting over the memory log.

use squid_types::error::RepositoryError;
use squid_types::memory::{MemoryRecord, MessageRole, UsageStats};

use super::store::MemoryRepository;

/// Default number of most recent records scanned.
pub const DEFAULT_USAGE_WINDOW: u32 = 1000;

/// Read-side aggregation of token counts stored on assistant records.
pub struct UsageAccountant<M: MemoryRepository> {
    repo: M,
    window: u32,
}

impl<M: MemoryRepository> UsageAccountant<M> {
    pub fn new(repo: M, window: u32) -> Self {
        Self { repo, window }
    }

    /// Totals over the most recent `window` records on all channels.
    ///
    /// Records without parseable metadata contribute nothing.
    pub async fn usage(&self) -> Result<UsageStats, RepositoryError> {
        let records = self.repo.recent_across_channels(self.window).await?;
        Ok(tally(&records))
    }
}

/// Sum token counts over assistant records that carry at least one counter.
pub fn tally(records: &[MemoryRecord]) -> UsageStats {
    records
        .iter()
        .filter(|r| r.role == MessageRole::Assistant)
        .filter_map(|r| r.metadata.as_ref())
        .filter(|m| m.has_token_counts())
        .fold(UsageStats::default(), |mut acc, m| {
            acc.total_input_tokens += m.input_tokens.unwrap_or(0);
            acc.total_output_tokens += m.output_tokens.unwrap_or(0);
            acc.assistant_message_count += 1;
            acc
        })
}
