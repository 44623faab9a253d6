//! Scan ledger: records outcomes, derives trust, enforces the manual quota.
//!
//! The ledger performs no network I/O. A low trust score is surfaced as a
//! [`TrustAlert`] on the returned [`RecordedScan`]; delivering it is the
//! caller's job.

use chrono::Utc;
use squid_types::config::ScanSettings;
use squid_types::error::{RepositoryError, ScanError};
use squid_types::scan::{
    NewScan, RecordedScan, ScanQuota, ScanRecord, ScanSummary, TriggerType, TrustAlert,
    trust_score_for,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::repository::ScanRepository;

#[derive(Debug, Clone, Copy)]
pub struct LedgerPolicy {
    pub free_scans: u32,
    pub alert_threshold: i64,
}

impl From<&ScanSettings> for LedgerPolicy {
    fn from(settings: &ScanSettings) -> Self {
        Self {
            free_scans: settings.free_scans,
            alert_threshold: settings.alert_threshold,
        }
    }
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self::from(&ScanSettings::default())
    }
}

pub struct ScanLedger<R: ScanRepository> {
    repo: R,
    policy: LedgerPolicy,
}

impl<R: ScanRepository> ScanLedger<R> {
    pub fn new(repo: R, policy: LedgerPolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    /// Persist a scan outcome.
    ///
    /// Fills in a missing id and timestamp, derives the trust score from the
    /// risk score unless one was supplied, and clamps it into `[0, 100]`.
    pub async fn record(&self, scan: NewScan) -> Result<RecordedScan, RepositoryError> {
        let trust_score = scan
            .trust_score
            .map(|t| t.clamp(0, 100))
            .unwrap_or_else(|| trust_score_for(scan.risk_score));

        let record = ScanRecord {
            id: scan
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("scan_{}", Uuid::now_v7())),
            trigger_type: scan.trigger_type,
            version: scan.version.unwrap_or_else(|| "1.0.0".to_string()),
            result: scan.result,
            risk_score: scan.risk_score,
            trust_score,
            findings: scan.findings,
            summary: scan.summary,
            permissions: scan.permissions,
            scanner_version: scan.scanner_version,
            patterns_checked: scan.patterns_checked,
            categories_checked: scan.categories_checked,
            files_scanned: scan.files_scanned,
            total_bytes: scan.total_bytes,
            scan_duration_ms: scan.scan_duration_ms,
            scanned_at: scan.scanned_at.unwrap_or_else(Utc::now),
        };

        self.repo.insert(&record).await?;

        let alert = (record.trust_score < self.policy.alert_threshold)
            .then(|| TrustAlert::new(&record.id, record.trust_score));

        match &alert {
            Some(_) => warn!(
                scan_id = %record.id,
                trust_score = record.trust_score,
                threshold = self.policy.alert_threshold,
                "Scan recorded below trust threshold"
            ),
            None => info!(
                scan_id = %record.id,
                trust_score = record.trust_score,
                trigger = %record.trigger_type,
                "Scan recorded"
            ),
        }

        Ok(RecordedScan {
            scan: record,
            alert,
        })
    }

    pub async fn latest(&self) -> Result<Option<ScanRecord>, RepositoryError> {
        self.repo.latest().await
    }

    /// Summary-shaped scans, most recent first.
    pub async fn history(&self, limit: u32) -> Result<Vec<ScanSummary>, RepositoryError> {
        let scans = self.repo.history(limit).await?;
        Ok(scans.iter().map(ScanSummary::from).collect())
    }

    pub async fn manual_count(&self) -> Result<u32, RepositoryError> {
        self.repo.count_by_trigger(TriggerType::Manual).await
    }

    pub async fn quota(&self) -> Result<ScanQuota, RepositoryError> {
        Ok(ScanQuota::new(self.manual_count().await?, self.policy.free_scans))
    }

    /// Gate a scan request. Non-manual triggers always pass.
    pub async fn check_quota(&self, trigger: TriggerType) -> Result<(), ScanError> {
        if trigger != TriggerType::Manual {
            return Ok(());
        }
        let quota = self.quota().await?;
        if quota.is_exhausted() {
            return Err(ScanError::QuotaExceeded {
                used: quota.used,
                allowed: quota.allowed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryScanRepository;
    use chrono::Duration;

    fn ledger() -> ScanLedger<InMemoryScanRepository> {
        ScanLedger::new(InMemoryScanRepository::default(), LedgerPolicy::default())
    }

    fn scan(trigger: TriggerType, risk: i64) -> NewScan {
        NewScan {
            trigger_type: trigger,
            risk_score: risk,
            ..NewScan::default()
        }
    }

    #[tokio::test]
    async fn test_latest_on_empty_ledger_is_none() {
        assert!(ledger().latest().await.unwrap().is_none());
        assert!(ledger().history(50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_trust_score_derived_from_risk() {
        let ledger = ledger();
        ledger.record(scan(TriggerType::Manual, 25)).await.unwrap();

        let latest = ledger.latest().await.unwrap().unwrap();
        assert_eq!(latest.trust_score, 75);
        assert!(latest.id.starts_with("scan_"));
        assert_eq!(latest.version, "1.0.0");
    }

    #[tokio::test]
    async fn test_trust_score_clamped() {
        let ledger = ledger();
        let recorded = ledger.record(scan(TriggerType::Scheduled, 140)).await.unwrap();
        assert_eq!(recorded.scan.trust_score, 0);

        let explicit = NewScan {
            trust_score: Some(150),
            ..scan(TriggerType::Scheduled, 0)
        };
        let recorded = ledger.record(explicit).await.unwrap();
        assert_eq!(recorded.scan.trust_score, 100);
    }

    #[tokio::test]
    async fn test_alert_below_threshold_only() {
        let ledger = ledger();
        let healthy = ledger.record(scan(TriggerType::Manual, 20)).await.unwrap();
        assert!(healthy.alert.is_none());

        let risky = ledger.record(scan(TriggerType::Manual, 21)).await.unwrap();
        let alert = risky.alert.unwrap();
        assert_eq!(alert.trust_score, 79);
        assert_eq!(alert.scan_id, risky.scan.id);
    }

    #[tokio::test]
    async fn test_quota_exhausted_after_allowance() {
        let ledger = ledger();
        for _ in 0..10 {
            ledger.check_quota(TriggerType::Manual).await.unwrap();
            ledger.record(scan(TriggerType::Manual, 0)).await.unwrap();
        }

        let err = ledger.check_quota(TriggerType::Manual).await.unwrap_err();
        assert!(matches!(
            err,
            ScanError::QuotaExceeded {
                used: 10,
                allowed: 10
            }
        ));
        ledger.check_quota(TriggerType::Scheduled).await.unwrap();

        let quota = ledger.quota().await.unwrap();
        assert_eq!(quota.remaining, 0);
    }

    #[tokio::test]
    async fn test_non_manual_scans_do_not_count() {
        let ledger = ledger();
        ledger.record(scan(TriggerType::Automatic, 0)).await.unwrap();
        ledger.record(scan(TriggerType::Scheduled, 0)).await.unwrap();
        assert_eq!(ledger.manual_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_history_most_recent_first() {
        let ledger = ledger();
        let now = Utc::now();
        for (i, id) in ["old", "mid", "new"].iter().enumerate() {
            let s = NewScan {
                id: Some(id.to_string()),
                scanned_at: Some(now + Duration::seconds(i as i64)),
                ..scan(TriggerType::Manual, 0)
            };
            ledger.record(s).await.unwrap();
        }

        let ids: Vec<String> = ledger
            .history(2)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid"]);
        assert_eq!(ledger.latest().await.unwrap().unwrap().id, "new");
    }
}
