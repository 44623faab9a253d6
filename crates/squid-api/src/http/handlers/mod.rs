//! HTTP request handlers for the REST API.

pub mod chat;
pub mod kv;
pub mod memory;
pub mod posts;
pub mod scan;
pub mod settings;
pub mod usage;
