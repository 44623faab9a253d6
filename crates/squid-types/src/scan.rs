//! Security scan types.
//!
//! A scan is one outcome from the external security scanner. Scans are
//! immutable once recorded; the trust score is always derived from the risk
//! score by [`trust_score_for`] unless the scanner supplied one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Manual scans allowed before the quota is exhausted.
pub const DEFAULT_FREE_SCANS: u32 = 10;

/// Trust scores strictly below this raise a [`TrustAlert`].
pub const DEFAULT_TRUST_ALERT_THRESHOLD: i64 = 80;

/// What caused a scan to run. Only `Manual` counts against the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    #[default]
    Manual,
    Scheduled,
    Automatic,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Manual => "manual",
            TriggerType::Scheduled => "scheduled",
            TriggerType::Automatic => "automatic",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(TriggerType::Manual),
            "scheduled" => Ok(TriggerType::Scheduled),
            "automatic" => Ok(TriggerType::Automatic),
            other => Err(format!("invalid trigger type: '{other}'")),
        }
    }
}

/// Derive a trust score from a risk score, clamped into `[0, 100]`.
pub fn trust_score_for(risk_score: i64) -> i64 {
    100i64.saturating_sub(risk_score).clamp(0, 100)
}

/// A scan outcome to be recorded.
///
/// Missing `id` and `scanned_at` are filled in at record time; a missing
/// `trust_score` is derived from `risk_score`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewScan {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_result")]
    pub result: String,
    #[serde(default)]
    pub risk_score: i64,
    #[serde(default)]
    pub trust_score: Option<i64>,
    #[serde(default)]
    pub findings: Vec<serde_json::Value>,
    #[serde(default)]
    pub summary: serde_json::Value,
    #[serde(default)]
    pub permissions: Vec<serde_json::Value>,
    #[serde(default)]
    pub scanner_version: String,
    #[serde(default)]
    pub patterns_checked: u64,
    #[serde(default)]
    pub categories_checked: u64,
    #[serde(default)]
    pub files_scanned: u64,
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub scan_duration_ms: u64,
    #[serde(default)]
    pub scanned_at: Option<DateTime<Utc>>,
}

fn default_result() -> String {
    "clean".to_string()
}

/// A persisted scan, full form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    pub trigger_type: TriggerType,
    pub version: String,
    pub result: String,
    pub risk_score: i64,
    pub trust_score: i64,
    pub findings: Vec<serde_json::Value>,
    pub summary: serde_json::Value,
    pub permissions: Vec<serde_json::Value>,
    pub scanner_version: String,
    pub patterns_checked: u64,
    pub categories_checked: u64,
    pub files_scanned: u64,
    pub total_bytes: u64,
    pub scan_duration_ms: u64,
    pub scanned_at: DateTime<Utc>,
}

/// A persisted scan, history-list form (no findings or report bodies).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub id: String,
    pub trigger_type: TriggerType,
    pub version: String,
    pub result: String,
    pub risk_score: i64,
    pub trust_score: i64,
    pub scanner_version: String,
    pub files_scanned: u64,
    pub total_bytes: u64,
    pub scanned_at: DateTime<Utc>,
}

impl From<&ScanRecord> for ScanSummary {
    fn from(scan: &ScanRecord) -> Self {
        Self {
            id: scan.id.clone(),
            trigger_type: scan.trigger_type,
            version: scan.version.clone(),
            result: scan.result.clone(),
            risk_score: scan.risk_score,
            trust_score: scan.trust_score,
            scanner_version: scan.scanner_version.clone(),
            files_scanned: scan.files_scanned,
            total_bytes: scan.total_bytes,
            scanned_at: scan.scanned_at,
        }
    }
}

/// Manual-scan allowance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanQuota {
    pub used: u32,
    pub allowed: u32,
    pub remaining: u32,
}

impl ScanQuota {
    pub fn new(used: u32, allowed: u32) -> Self {
        Self {
            used,
            allowed,
            remaining: allowed.saturating_sub(used),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.allowed
    }
}

/// Raised when a freshly recorded scan falls below the trust threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustAlert {
    pub scan_id: String,
    pub trust_score: i64,
    pub message: String,
}

impl TrustAlert {
    pub fn new(scan_id: impl Into<String>, trust_score: i64) -> Self {
        Self {
            scan_id: scan_id.into(),
            trust_score,
            message: format!(
                "Security scan alert: Trust score dropped to {trust_score}/100. Check your scan report."
            ),
        }
    }
}

/// Result of recording a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedScan {
    pub scan: ScanRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<TrustAlert>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_score_is_inverse_of_risk() {
        assert_eq!(trust_score_for(0), 100);
        assert_eq!(trust_score_for(25), 75);
        assert_eq!(trust_score_for(100), 0);
    }

    #[test]
    fn test_trust_score_clamps_out_of_range_risk() {
        assert_eq!(trust_score_for(140), 0);
        assert_eq!(trust_score_for(-20), 100);
        assert_eq!(trust_score_for(i64::MIN), 100);
        assert_eq!(trust_score_for(i64::MAX), 0);
    }

    #[test]
    fn test_trigger_type_parse_and_display() {
        for t in [
            TriggerType::Manual,
            TriggerType::Scheduled,
            TriggerType::Automatic,
        ] {
            assert_eq!(t.to_string().parse::<TriggerType>().unwrap(), t);
        }
        assert!("cron".parse::<TriggerType>().is_err());
    }

    #[test]
    fn test_quota_remaining_saturates() {
        let quota = ScanQuota::new(12, 10);
        assert_eq!(quota.remaining, 0);
        assert!(quota.is_exhausted());
        assert!(!ScanQuota::new(9, 10).is_exhausted());
    }

    #[test]
    fn test_new_scan_defaults_from_sparse_json() {
        let scan: NewScan = serde_json::from_str(r#"{"risk_score": 5}"#).unwrap();
        assert_eq!(scan.trigger_type, TriggerType::Manual);
        assert_eq!(scan.result, "clean");
        assert!(scan.findings.is_empty());
        assert!(scan.trust_score.is_none());
    }

    #[test]
    fn test_trust_alert_message() {
        let alert = TrustAlert::new("scan_1", 42);
        assert_eq!(
            alert.message,
            "Security scan alert: Trust score dropped to 42/100. Check your scan report."
        );
    }
}
