//! Shared domain types for the squid agent.
//!
//! This crate contains the domain types used across the workspace: memory
//! records, key-value entries, security scans, post log entries, skills,
//! LLM request/response shapes, settings, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod post;
pub mod scan;
pub mod skill;
pub mod storage;
