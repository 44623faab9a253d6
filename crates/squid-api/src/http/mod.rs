//! HTTP/REST API layer for the squid agent.
//!
//! Axum-based REST API at `/api/v1/` with envelope responses and CORS
//! support. `/health` sits at the root for platform health checks.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
