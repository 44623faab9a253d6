//! Chat orchestration: persist, assemble, complete, persist.

pub mod service;
