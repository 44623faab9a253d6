//! HTTP client for the SquidBay security scanner.
//!
//! `POST {api_base}/scan` with the agent credentials in `x-agent-id` /
//! `x-agent-key` headers. Scans can take a while, so the request carries its
//! own timeout independent of the LLM client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use squid_core::scan::scanner::{ScanRequest, Scanner};
use squid_types::error::ScanError;
use squid_types::scan::NewScan;
use tracing::{debug, warn};

/// Version stamped on scans recorded by this build.
const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scanner response body. Every field is optional; absent values fall back
/// to the ledger defaults.
#[derive(Debug, Default, Deserialize)]
struct ScanResponse {
    id: Option<String>,
    result: Option<String>,
    risk_score: Option<Value>,
    #[serde(default)]
    findings: Vec<Value>,
    #[serde(default)]
    summary: Value,
    #[serde(default)]
    permissions: Vec<Value>,
    scanner_version: Option<String>,
    patterns_checked: Option<u64>,
    categories_checked: Option<u64>,
    scan_duration_ms: Option<u64>,
    scanned_at: Option<String>,
}

/// Any JSON number, rounded and saturated into `i64`. Non-numbers count as 0.
fn risk_from_json(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
        .unwrap_or_else(|| {
            warn!(risk_score = %value, "Scanner risk score is not a number, using 0");
            0
        })
}

impl ScanResponse {
    fn into_new_scan(self) -> NewScan {
        let summary_count = |field: &str| self.summary.get(field).and_then(Value::as_u64).unwrap_or(0);
        let files_scanned = summary_count("files_scanned");
        let total_bytes = summary_count("total_bytes");

        let scanned_at = self.scanned_at.as_deref().and_then(|raw| {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    warn!(scanned_at = raw, error = %e, "Scanner timestamp unreadable, using now");
                    None
                }
            }
        });

        NewScan {
            id: self.id.filter(|id| !id.is_empty()),
            version: Some(AGENT_VERSION.to_string()),
            result: self.result.unwrap_or_else(|| "clean".to_string()),
            risk_score: self.risk_score.as_ref().map_or(0, risk_from_json),
            // Always derived from the risk score.
            trust_score: None,
            findings: self.findings,
            summary: if self.summary.is_null() {
                Value::Object(Default::default())
            } else {
                self.summary
            },
            permissions: self.permissions,
            scanner_version: self.scanner_version.unwrap_or_default(),
            patterns_checked: self.patterns_checked.unwrap_or(0),
            categories_checked: self.categories_checked.unwrap_or(0),
            files_scanned,
            total_bytes,
            scan_duration_ms: self.scan_duration_ms.unwrap_or(0),
            scanned_at,
            ..NewScan::default()
        }
    }
}

/// [`Scanner`] backed by the SquidBay HTTP API.
pub struct HttpScanner {
    client: reqwest::Client,
    api_base: String,
    agent_id: Option<String>,
    api_key: Option<SecretString>,
}

impl HttpScanner {
    pub fn new(
        api_base: impl Into<String>,
        agent_id: Option<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScanError::Scanner(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            agent_id,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/scan", self.api_base.trim_end_matches('/'))
    }
}

impl Scanner for HttpScanner {
    async fn scan(&self, request: &ScanRequest) -> Result<NewScan, ScanError> {
        let url = self.url();
        debug!(url = %url, repo = %request.repo, "Requesting security scan");

        let response = self
            .client
            .post(&url)
            .header("x-agent-id", self.agent_id.as_deref().unwrap_or_default())
            .header(
                "x-agent-key",
                self.api_key
                    .as_ref()
                    .map(|k| k.expose_secret())
                    .unwrap_or_default(),
            )
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScanError::Scanner("scan request timed out".into())
                } else {
                    ScanError::Scanner(format!("scan request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScanError::Scanner(format!("Scan API error ({status}): {body}")));
        }

        let body: ScanResponse = response
            .json()
            .await
            .map_err(|e| ScanError::Scanner(format!("unreadable scan response: {e}")))?;

        Ok(body.into_new_scan())
    }
}
