//! Post log handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use squid_types::post::{PostLogEntry, PostStatus};

use crate::http::error::AppError;
use crate::http::extractors::query::{PostsQuery, effective_limit, non_blank};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/posts - Recent post log entries, optionally for one channel.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Result<ApiResponse<Vec<PostLogEntry>>, AppError> {
    let start = Instant::now();
    let channel = non_blank(query.channel);
    let limit = effective_limit(query.limit, PostsQuery::DEFAULT);
    let posts = state.post_recorder.recent(channel.as_deref(), limit).await?;
    Ok(ApiResponse::success(posts, start).with_link("self", "/api/v1/posts"))
}

/// Request body for recording a post made by an external publisher.
#[derive(Debug, Deserialize)]
pub struct RecordPostRequest {
    pub channel: String,
    pub content: String,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub scheduled: bool,
    #[serde(default)]
    pub status: PostStatus,
}

/// POST /api/v1/posts - Record a published (or failed) post.
pub async fn record_post(
    State(state): State<AppState>,
    Json(body): Json<RecordPostRequest>,
) -> Result<ApiResponse<PostLogEntry>, AppError> {
    let start = Instant::now();
    let channel = body.channel.trim();
    if channel.is_empty() {
        return Err(AppError::Validation("channel is required".into()));
    }
    if body.content.trim().is_empty() {
        return Err(AppError::Validation("content is required".into()));
    }

    let entry = match body.status {
        PostStatus::Posted => {
            state
                .post_recorder
                .record_published(channel, &body.content, body.post_id, body.scheduled)
                .await?
        }
        PostStatus::Failed => state.post_recorder.record_failed(channel, &body.content).await?,
    };

    Ok(ApiResponse::success(entry, start).with_status(StatusCode::CREATED))
}
