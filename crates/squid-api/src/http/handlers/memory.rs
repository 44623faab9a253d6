//! Memory log handlers.

use std::time::Instant;

use axum::extract::{Query, State};
use serde::Serialize;
use squid_core::memory::store::MemoryRepository;
use squid_types::memory::{MemoryRecord, MemoryStats};

use crate::http::error::AppError;
use crate::http::extractors::query::{MemoryQuery, PurgeQuery, effective_limit, non_blank};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/memory - Search, one channel, or everything, in that priority.
pub async fn list_memory(
    State(state): State<AppState>,
    Query(query): Query<MemoryQuery>,
) -> Result<ApiResponse<Vec<MemoryRecord>>, AppError> {
    let start = Instant::now();

    let records = if let Some(search) = non_blank(query.search) {
        let limit = effective_limit(query.limit, MemoryQuery::SEARCH_DEFAULT);
        state.memory.search(&search, limit).await?
    } else if let Some(channel) = non_blank(query.channel) {
        let limit = effective_limit(query.limit, MemoryQuery::CHANNEL_DEFAULT);
        state.memory.recent(&channel, limit).await?
    } else {
        let limit = effective_limit(query.limit, MemoryQuery::ALL_DEFAULT);
        state.memory.recent_across_channels(limit).await?
    };

    Ok(ApiResponse::success(records, start)
        .with_link("self", "/api/v1/memory")
        .with_link("stats", "/api/v1/memory/stats"))
}

/// GET /api/v1/memory/stats - Record counts per channel.
pub async fn memory_stats(
    State(state): State<AppState>,
) -> Result<ApiResponse<MemoryStats>, AppError> {
    let start = Instant::now();
    let stats = state.memory.stats().await?;
    Ok(ApiResponse::success(stats, start))
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub cleared: bool,
    pub channel: String,
    pub removed: u64,
}

/// DELETE /api/v1/memory - Purge one channel, or all memory when none is given.
pub async fn purge_memory(
    State(state): State<AppState>,
    Query(query): Query<PurgeQuery>,
) -> Result<ApiResponse<PurgeResponse>, AppError> {
    let start = Instant::now();
    let channel = non_blank(query.channel);
    let removed = state.memory.purge(channel.as_deref()).await?;

    Ok(ApiResponse::success(
        PurgeResponse {
            cleared: true,
            channel: channel.unwrap_or_else(|| "all".to_string()),
            removed,
        },
        start,
    ))
}
