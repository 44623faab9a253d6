//! Health and settings views.
//!
//! Both are read-only snapshots assembled from settings, the memory log,
//! the scan ledger and usage accounting.

use std::time::Instant;

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use squid_core::memory::store::MemoryRepository;
use squid_infra::config::ChannelStatus;
use squid_types::memory::MemoryStats;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const MARKETPLACE_URL: &str = "https://squidbay.io";

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub agent: String,
    pub version: &'static str,
    pub uptime: u64,
    pub memory: MemoryStats,
    pub channels: ChannelStatus,
    pub trust_score: Option<i64>,
    pub lightning: bool,
}

/// GET /health - Liveness plus a short status summary.
pub async fn health(State(state): State<AppState>) -> Result<ApiResponse<HealthReport>, AppError> {
    let start = Instant::now();
    let memory = state.memory.stats().await?;
    let latest = state.scan_service.ledger().latest().await?;

    let report = HealthReport {
        status: "ok",
        agent: state.settings.agent_name.clone(),
        version: VERSION,
        uptime: state.uptime_secs(),
        memory,
        channels: state.channels,
        trust_score: latest.map(|scan| scan.trust_score),
        lightning: state.settings.lightning_address.is_some(),
    };
    Ok(ApiResponse::success(report, start).with_link("settings", "/api/v1/settings"))
}

#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub agent: AgentView,
    pub ai_provider: ProviderView,
    pub wallet: WalletView,
    pub channels: ChannelStatus,
    pub security: SecurityView,
    pub usage: UsageView,
    pub squidbay: SquidBayView,
}

#[derive(Debug, Serialize)]
pub struct AgentView {
    pub name: String,
    pub version: &'static str,
    pub uptime: u64,
}

#[derive(Debug, Serialize)]
pub struct ProviderView {
    pub name: &'static str,
    pub provider: &'static str,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct WalletView {
    pub address: Option<String>,
    pub configured: bool,
}

#[derive(Debug, Serialize)]
pub struct SecurityView {
    pub trust_score: Option<i64>,
    pub last_scan: Option<DateTime<Utc>>,
    pub result: Option<String>,
    pub scans_used: u32,
    pub scans_free: u32,
    pub scans_remaining: u32,
}

#[derive(Debug, Serialize)]
pub struct UsageView {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_messages: u64,
}

#[derive(Debug, Serialize)]
pub struct SquidBayView {
    pub agent_id: Option<String>,
    pub marketplace: &'static str,
    pub api: String,
}

/// GET /api/v1/settings - The agent command center view.
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<ApiResponse<SettingsView>, AppError> {
    let start = Instant::now();
    let settings = &state.settings;
    let ledger = state.scan_service.ledger();

    let latest = ledger.latest().await?;
    let quota = ledger.quota().await?;
    let usage = state.usage.usage().await?;

    let view = SettingsView {
        agent: AgentView {
            name: settings.agent_name.clone(),
            version: VERSION,
            uptime: state.uptime_secs(),
        },
        ai_provider: ProviderView {
            name: "Claude",
            provider: "Anthropic",
            model: settings.claude.model.clone(),
            max_tokens: settings.claude.max_tokens,
        },
        wallet: WalletView {
            address: settings.lightning_address.clone(),
            configured: settings.lightning_address.is_some(),
        },
        channels: state.channels,
        security: SecurityView {
            trust_score: latest.as_ref().map(|scan| scan.trust_score),
            last_scan: latest.as_ref().map(|scan| scan.scanned_at),
            result: latest.map(|scan| scan.result),
            scans_used: quota.used,
            scans_free: quota.allowed,
            scans_remaining: quota.remaining,
        },
        usage: UsageView {
            total_input_tokens: usage.total_input_tokens,
            total_output_tokens: usage.total_output_tokens,
            total_messages: usage.assistant_message_count,
        },
        squidbay: SquidBayView {
            agent_id: settings.squidbay.agent_id.clone(),
            marketplace: MARKETPLACE_URL,
            api: settings.squidbay.api_base.clone(),
        },
    };

    Ok(ApiResponse::success(view, start).with_link("self", "/api/v1/settings"))
}
