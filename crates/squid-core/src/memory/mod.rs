//! Cross-channel conversational memory.
//!
//! - `MemoryRepository`: the durable append-only record log
//! - `ContextAssembler`: builds the bounded turn list sent to the model
//! - `UsageAccountant`: token totals derived from assistant records

pub mod context;
pub mod store;
pub mod usage;
