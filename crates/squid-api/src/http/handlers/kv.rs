//! Key-value settings handlers.
//!
//! Values are arbitrary JSON. A plain string is stored verbatim.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use serde_json::Value;
use squid_core::storage::kv_store::KvStore;
use squid_types::storage::KvEntry;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct KvValue {
    pub key: String,
    pub value: Value,
}

/// GET /api/v1/kv - All entries, sorted by key.
pub async fn list_entries(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<KvEntry>>, AppError> {
    let start = Instant::now();
    let entries = state.kv.list().await?;
    Ok(ApiResponse::success(entries, start).with_link("self", "/api/v1/kv"))
}

/// GET /api/v1/kv/{key}
pub async fn get_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<KvValue>, AppError> {
    let start = Instant::now();
    let value = state
        .kv
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("key '{key}' not found")))?;
    Ok(ApiResponse::success(KvValue { key, value }, start))
}

/// PUT /api/v1/kv/{key} - Body is the raw JSON value.
pub async fn put_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> Result<ApiResponse<KvValue>, AppError> {
    let start = Instant::now();
    if key.trim().is_empty() {
        return Err(AppError::Validation("key must not be empty".into()));
    }
    state.kv.set(&key, &value).await?;
    Ok(ApiResponse::success(KvValue { key, value }, start))
}

#[derive(Debug, Serialize)]
pub struct KvDeleted {
    pub key: String,
    pub deleted: bool,
}

/// DELETE /api/v1/kv/{key} - Deleting a missing key is not an error.
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<KvDeleted>, AppError> {
    let start = Instant::now();
    state.kv.delete(&key).await?;
    Ok(ApiResponse::success(KvDeleted { key, deleted: true }, start))
}
