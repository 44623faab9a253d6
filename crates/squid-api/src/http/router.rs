//! Axum router configuration with middleware.
//!
//! API routes live under `/api/v1/`; `/health` sits at the root for
//! platform health checks.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/chat", post(handlers::chat::chat))
        // Memory
        .route(
            "/memory",
            get(handlers::memory::list_memory).delete(handlers::memory::purge_memory),
        )
        .route("/memory/stats", get(handlers::memory::memory_stats))
        .route("/usage", get(handlers::usage::get_usage))
        // Security scans
        .route(
            "/scan",
            get(handlers::scan::latest_scan).post(handlers::scan::trigger_scan),
        )
        .route("/scan/history", get(handlers::scan::scan_history))
        // Key-value settings
        .route("/kv", get(handlers::kv::list_entries))
        .route(
            "/kv/{key}",
            get(handlers::kv::get_entry)
                .put(handlers::kv::put_entry)
                .delete(handlers::kv::delete_entry),
        )
        // Post log
        .route(
            "/posts",
            get(handlers::posts::list_posts).post(handlers::posts::record_post),
        )
        .route("/settings", get(handlers::settings::get_settings));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::settings::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
