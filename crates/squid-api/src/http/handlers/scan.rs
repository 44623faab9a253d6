//! Security scan handlers.
//!
//! POST runs a scan through the quota gate; GET returns the latest full
//! record; history returns summaries newest first.

use std::time::Instant;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use squid_types::scan::{RecordedScan, ScanRecord, ScanSummary, TriggerType};

use crate::http::error::AppError;
use crate::http::extractors::query::{HistoryQuery, effective_limit};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for triggering a scan.
#[derive(Debug, Default, Deserialize)]
pub struct TriggerScanRequest {
    /// Repository URL; falls back to `GITHUB_REPO`.
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub trigger_type: TriggerType,
}

/// POST /api/v1/scan - Run and record a scan.
pub async fn trigger_scan(
    State(state): State<AppState>,
    Json(body): Json<TriggerScanRequest>,
) -> Result<ApiResponse<RecordedScan>, AppError> {
    let start = Instant::now();
    let recorded = state
        .scan_service
        .trigger(body.trigger_type, body.repo)
        .await?;

    Ok(ApiResponse::success(recorded, start)
        .with_status(StatusCode::CREATED)
        .with_link("latest", "/api/v1/scan"))
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LatestScan {
    Scan(Box<ScanRecord>),
    Empty { message: &'static str },
}

/// GET /api/v1/scan - Latest scan, or a hint when none has run.
pub async fn latest_scan(
    State(state): State<AppState>,
) -> Result<ApiResponse<LatestScan>, AppError> {
    let start = Instant::now();
    let latest = match state.scan_service.ledger().latest().await? {
        Some(scan) => LatestScan::Scan(Box::new(scan)),
        None => LatestScan::Empty {
            message: "No scans yet. POST /scan to run one.",
        },
    };
    Ok(ApiResponse::success(latest, start).with_link("history", "/api/v1/scan/history"))
}

#[derive(Debug, Serialize)]
pub struct ScanHistory {
    pub history: Vec<ScanSummary>,
    pub total: usize,
}

/// GET /api/v1/scan/history - Scan summaries, newest first.
pub async fn scan_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<ApiResponse<ScanHistory>, AppError> {
    let start = Instant::now();
    let limit = effective_limit(query.limit, HistoryQuery::DEFAULT);
    let history = state.scan_service.ledger().history(limit).await?;
    let total = history.len();
    Ok(ApiResponse::success(ScanHistory { history, total }, start))
}
