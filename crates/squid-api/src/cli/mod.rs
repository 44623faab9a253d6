//! CLI command definitions for the `squid` binary.
//!
//! Uses clap derive macros for argument parsing. Resource commands follow a
//! noun-verb pattern (e.g., `squid memory search`, `squid scan history`).

pub mod chat;
pub mod kv;
pub mod memory;
pub mod scan;
pub mod skill;
pub mod status;
pub mod usage;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use comfy_table::{ContentArrangement, Table, presets};

/// Run and inspect your personal squid agent.
#[derive(Parser)]
#[command(name = "squid", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "SQUID_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to PORT or the configured port).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Send one message to the agent and print the reply.
    Chat {
        /// The message to send.
        message: String,

        /// Channel the message arrives on.
        #[arg(short, long, default_value = squid_types::memory::PRIMARY_CHANNEL)]
        channel: String,
    },

    /// Browse, search, and purge the memory log.
    Memory {
        #[command(subcommand)]
        action: memory::MemoryCommand,
    },

    /// Manage the agent's key-value settings (get, set, delete, list).
    Kv {
        #[command(subcommand)]
        action: kv::KvCommand,
    },

    /// Security scans (latest, history, quota).
    Scan {
        #[command(subcommand)]
        action: scan::ScanCommand,
    },

    /// Manage installed skills (list, add).
    Skill {
        #[command(subcommand)]
        action: skill::SkillCommand,
    },

    /// Token usage over recent replies.
    Usage,

    /// System status dashboard.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Table preset shared by every listing command.
pub(crate) fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Shorten `text` to at most `max` characters for table cells.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let cut: String = single_line.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Compact token counts: 1.2K, 3.4M.
pub(crate) fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_memory_search() {
        let cli = Cli::parse_from(["squid", "--json", "memory", "search", "lightning", "-l", "5"]);
        assert!(cli.json);
        match cli.command {
            Commands::Memory {
                action: memory::MemoryCommand::Search { query, limit },
            } => {
                assert_eq!(query, "lightning");
                assert_eq!(limit, 5);
            }
            _ => panic!("expected memory search"),
        }
    }

    #[test]
    fn test_chat_defaults_to_primary_channel() {
        let cli = Cli::parse_from(["squid", "chat", "hello"]);
        match cli.command {
            Commands::Chat { message, channel } => {
                assert_eq!(message, "hello");
                assert_eq!(channel, "chat");
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("line\nbreak", 20), "line break");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(950), "950");
        assert_eq!(format_tokens(1_500), "1.5K");
        assert_eq!(format_tokens(2_300_000), "2.3M");
    }
}
