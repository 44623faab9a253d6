//! Agent-level key-value settings storage.
//!
//! Implementations live in squid-infra.

pub mod kv_store;
