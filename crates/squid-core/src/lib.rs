//! Business logic and repository trait definitions for the squid agent.
//!
//! This crate defines the "ports" (repository, provider, scanner, notifier
//! traits) that the infrastructure layer implements, plus the services built
//! on them: context assembly, usage accounting, the scan ledger, and chat
//! orchestration. It depends only on `squid-types` -- never on `squid-infra`
//! or any database/IO crate.

pub mod agent;
pub mod chat;
pub mod llm;
pub mod memory;
pub mod notify;
pub mod post;
pub mod scan;
pub mod skill;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
