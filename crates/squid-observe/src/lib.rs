//! Observability setup for the squid agent: tracing subscriber with
//! plain or JSON output and optional OpenTelemetry span export.

pub mod tracing_setup;

pub use tracing_setup::{LogFormat, init_tracing, shutdown_tracing};
