//! Security scan bookkeeping.
//!
//! The ledger records outcomes, derives trust scores, and enforces the
//! manual-scan quota. The service drives the external scanner and hands
//! low-trust alerts to a notifier.

pub mod ledger;
pub mod repository;
pub mod scanner;
pub mod service;
