//! GET /api/v1/usage - Token totals over the recent assistant window.

use std::time::Instant;

use axum::extract::State;
use squid_types::memory::UsageStats;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

pub async fn get_usage(State(state): State<AppState>) -> Result<ApiResponse<UsageStats>, AppError> {
    let start = Instant::now();
    let stats = state.usage.usage().await?;
    Ok(ApiResponse::success(stats, start).with_link("self", "/api/v1/usage"))
}
