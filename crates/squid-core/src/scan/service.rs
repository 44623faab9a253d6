//! Scan orchestration: quota gate, remote scan, ledger, alert delivery.

use squid_types::error::ScanError;
use squid_types::scan::{RecordedScan, TriggerType};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use super::ledger::ScanLedger;
use super::repository::ScanRepository;
use super::scanner::{ScanRequest, Scanner};
use crate::notify::BoxNotifier;

/// Who is requesting scans, and what to scan by default.
#[derive(Debug, Clone, Default)]
pub struct ScanIdentity {
    pub agent_name: String,
    pub agent_id: Option<String>,
    pub default_repo: Option<String>,
}

pub struct ScanService<R: ScanRepository, S: Scanner> {
    ledger: ScanLedger<R>,
    scanner: S,
    notifier: BoxNotifier,
    identity: ScanIdentity,
    // Held from quota check to record for manual scans.
    manual_gate: Mutex<()>,
}

impl<R: ScanRepository, S: Scanner> ScanService<R, S> {
    pub fn new(ledger: ScanLedger<R>, scanner: S, notifier: BoxNotifier, identity: ScanIdentity) -> Self {
        Self {
            ledger,
            scanner,
            notifier,
            identity,
            manual_gate: Mutex::new(()),
        }
    }

    pub fn ledger(&self) -> &ScanLedger<R> {
        &self.ledger
    }

    /// Run a scan of `repo` (or the configured default) and record it.
    ///
    /// Manual triggers are refused once the free allowance is used up. When
    /// the recorded trust score is below threshold the owner is notified.
    /// Manual scans run one at a time so concurrent requests cannot both
    /// pass the quota check before either is recorded.
    #[instrument(skip(self, repo))]
    pub async fn trigger(
        &self,
        trigger: TriggerType,
        repo: Option<String>,
    ) -> Result<RecordedScan, ScanError> {
        let manual_slot = match trigger {
            TriggerType::Manual => Some(self.manual_gate.lock().await),
            _ => None,
        };
        self.ledger.check_quota(trigger).await?;

        let repo = repo
            .filter(|r| !r.trim().is_empty())
            .or_else(|| self.identity.default_repo.clone())
            .ok_or(ScanError::MissingTarget)?;

        let request = ScanRequest {
            repo,
            agent_id: self.identity.agent_id.clone(),
            agent_name: self.identity.agent_name.clone(),
        };
        info!(repo = %request.repo, "Requesting security scan");

        let mut outcome = self.scanner.scan(&request).await?;
        outcome.trigger_type = trigger;

        let recorded = self.ledger.record(outcome).await?;
        drop(manual_slot);

        if let Some(alert) = &recorded.alert {
            self.notifier.notify(&alert.message).await;
        }
        Ok(recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ledger::LedgerPolicy;
    use crate::testing::{FixedScanner, InMemoryScanRepository, RecordingNotifier};

    fn service(
        risk: i64,
        default_repo: Option<&str>,
    ) -> (
        ScanService<InMemoryScanRepository, FixedScanner>,
        FixedScanner,
        RecordingNotifier,
    ) {
        let scanner = FixedScanner {
            risk_score: risk,
            ..FixedScanner::default()
        };
        let notifier = RecordingNotifier::default();
        let service = ScanService::new(
            ScanLedger::new(InMemoryScanRepository::default(), LedgerPolicy::default()),
            scanner.clone(),
            BoxNotifier::new(notifier.clone()),
            ScanIdentity {
                agent_name: "Inky".into(),
                agent_id: Some("agent-7".into()),
                default_repo: default_repo.map(String::from),
            },
        );
        (service, scanner, notifier)
    }

    #[tokio::test]
    async fn test_trigger_records_and_uses_default_repo() {
        let (service, scanner, notifier) = service(10, Some("octo/inky"));

        let recorded = service.trigger(TriggerType::Manual, None).await.unwrap();

        assert_eq!(recorded.scan.trust_score, 90);
        assert_eq!(recorded.scan.trigger_type, TriggerType::Manual);
        let requests = scanner.requests.lock().unwrap();
        assert_eq!(requests[0].repo, "octo/inky");
        assert_eq!(requests[0].agent_id.as_deref(), Some("agent-7"));
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_target_is_rejected() {
        let (service, scanner, _) = service(0, None);
        let err = service.trigger(TriggerType::Manual, Some("  ".into())).await.unwrap_err();
        assert!(matches!(err, ScanError::MissingTarget));
        assert!(scanner.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_low_trust_notifies_owner() {
        let (service, _, notifier) = service(45, Some("octo/inky"));

        service.trigger(TriggerType::Scheduled, None).await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("55/100"));
    }

    #[tokio::test]
    async fn test_quota_blocks_before_calling_scanner() {
        let (service, scanner, _) = service(0, Some("octo/inky"));
        for _ in 0..10 {
            service.trigger(TriggerType::Manual, None).await.unwrap();
        }

        let err = service.trigger(TriggerType::Manual, None).await.unwrap_err();
        assert!(matches!(err, ScanError::QuotaExceeded { used: 10, allowed: 10 }));
        assert_eq!(scanner.requests.lock().unwrap().len(), 10);

        service.trigger(TriggerType::Automatic, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_manual_scans_respect_quota() {
        let scanner = FixedScanner {
            delay: std::time::Duration::from_millis(50),
            ..FixedScanner::default()
        };
        let service = std::sync::Arc::new(ScanService::new(
            ScanLedger::new(InMemoryScanRepository::default(), LedgerPolicy::default()),
            scanner.clone(),
            BoxNotifier::new(RecordingNotifier::default()),
            ScanIdentity {
                default_repo: Some("octo/inky".into()),
                ..ScanIdentity::default()
            },
        ));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..15 {
            let service = service.clone();
            tasks.spawn(async move { service.trigger(TriggerType::Manual, None).await });
        }

        let (mut ok, mut refused) = (0, 0);
        while let Some(joined) = tasks.join_next().await {
            match joined.unwrap() {
                Ok(_) => ok += 1,
                Err(ScanError::QuotaExceeded { used: 10, allowed: 10 }) => refused += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!((ok, refused), (10, 5));
        assert_eq!(service.ledger().manual_count().await.unwrap(), 10);
        assert_eq!(scanner.requests.lock().unwrap().len(), 10);
    }
}
