//! Chat endpoint.
//!
//! POST /api/v1/chat
//!
//! A model failure is not an HTTP failure: the caller gets a stable,
//! human-readable reply with `error: true`, and the user turn stays in
//! memory.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use squid_types::error::ChatError;
use squid_types::llm::Usage;
use squid_types::memory::{PRIMARY_CHANNEL, RecordMetadata};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Defaults to `chat`.
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub metadata: Option<RecordMetadata>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

/// POST /api/v1/chat - Send one message and get the agent's reply.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<ApiResponse<ChatResponse>, AppError> {
    let start = Instant::now();
    let channel = body
        .channel
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| PRIMARY_CHANNEL.to_string());

    let response = match state
        .chat_service
        .chat(&channel, &body.message, body.metadata)
        .await
    {
        Ok(reply) => ChatResponse {
            reply: reply.reply,
            usage: Some(reply.usage),
            error: false,
        },
        Err(ChatError::Llm { kind, .. }) => ChatResponse {
            reply: kind.user_message().to_string(),
            usage: None,
            error: true,
        },
        Err(e) => return Err(e.into()),
    };

    Ok(ApiResponse::success(response, start).with_link("memory", "/api/v1/memory"))
}
