//! Agent identity: the system preamble.

pub mod prompt;
