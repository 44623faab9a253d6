//! Infrastructure layer: SQLite repositories, outbound HTTP clients, and the
//! configuration loader. Implements the traits defined in `squid-core`.

pub mod config;
pub mod llm;
pub mod scanner;
pub mod sqlite;
pub mod twilio;
