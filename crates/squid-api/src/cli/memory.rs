//! Memory log commands: list, search, stats, purge.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color};
use console::style;
use dialoguer::Confirm;

use squid_core::memory::store::MemoryRepository;
use squid_types::memory::{MemoryRecord, MessageRole};

use super::{new_table, print_json, truncate};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum MemoryCommand {
    /// List recent records, across all channels or for one.
    List {
        /// Only this channel.
        #[arg(short, long)]
        channel: Option<String>,

        /// Maximum records to show.
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },

    /// Case-insensitive search over record content.
    Search {
        query: String,

        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },

    /// Record counts per channel.
    Stats,

    /// Delete records for one channel, or everything.
    Purge {
        /// Only this channel; omit to wipe all memory.
        #[arg(short, long)]
        channel: Option<String>,

        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_memory_command(cmd: MemoryCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        MemoryCommand::List { channel, limit } => {
            let records = match channel.as_deref() {
                Some(channel) => state.memory.recent(channel, limit).await?,
                None => state.memory.recent_across_channels(limit).await?,
            };
            show_records(&records, json, "No memory yet. Say hi with: squid chat \"hello\"")
        }
        MemoryCommand::Search { query, limit } => {
            let records = state.memory.search(&query, limit).await?;
            show_records(&records, json, &format!("Nothing matches '{query}'."))
        }
        MemoryCommand::Stats => stats(state, json).await,
        MemoryCommand::Purge { channel, force } => purge(state, channel, force, json).await,
    }
}

fn show_records(records: &[MemoryRecord], json: bool, empty_hint: &str) -> Result<()> {
    if json {
        return print_json(&records);
    }

    println!();
    if records.is_empty() {
        println!("  {} {}", style("i").blue().bold(), empty_hint);
        println!();
        return Ok(());
    }

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Channel").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Content").fg(Color::White),
        Cell::new("Time").fg(Color::White),
    ]);

    for record in records {
        let role = match record.role {
            MessageRole::User => Cell::new("user").fg(Color::Yellow),
            MessageRole::Assistant => Cell::new("assistant").fg(Color::Green),
        };
        table.add_row(vec![
            Cell::new(record.id).fg(Color::DarkGrey),
            Cell::new(&record.channel).fg(Color::Cyan),
            role,
            Cell::new(truncate(&record.content, 70)),
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {} record{}",
        style(records.len()).bold(),
        if records.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

async fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.memory.stats().await?;
    if json {
        return print_json(&stats);
    }

    println!();
    println!("  Memory: {} records", style(stats.total).bold());
    println!();
    if stats.channels.is_empty() {
        return Ok(());
    }

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Channel").fg(Color::White),
        Cell::new("Records").fg(Color::White),
    ]);
    for entry in &stats.channels {
        table.add_row(vec![
            Cell::new(&entry.channel).fg(Color::Cyan),
            Cell::new(entry.count),
        ]);
    }
    println!("{table}");
    println!();
    Ok(())
}

async fn purge(state: &AppState, channel: Option<String>, force: bool, json: bool) -> Result<()> {
    let scope = channel.as_deref().unwrap_or("all channels");

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Wipe memory for {}? This cannot be undone.",
                style(scope).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let removed = state.memory.purge(channel.as_deref()).await?;

    if json {
        return print_json(&serde_json::json!({
            "cleared": true,
            "channel": channel.as_deref().unwrap_or("all"),
            "removed": removed,
        }));
    }

    println!();
    println!(
        "  {} Removed {} record{} from {}",
        style("ok").green(),
        style(removed).bold(),
        if removed == 1 { "" } else { "s" },
        scope,
    );
    println!();
    Ok(())
}
