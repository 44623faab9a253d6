//! Key-value settings subcommands.
//!
//! Values support arbitrary JSON (objects, arrays, strings, numbers, etc.).

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color};
use console::style;
use serde_json::Value;

use squid_core::storage::kv_store::KvStore;

use super::{new_table, print_json, truncate};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum KvCommand {
    /// Set a key (value is JSON; anything else is stored as a string).
    Set {
        key: String,
        value: String,
    },

    /// Get a value by key.
    Get {
        key: String,
    },

    /// Delete a key.
    Delete {
        key: String,
    },

    /// List all keys with a value preview.
    List,
}

pub async fn handle_kv_command(cmd: KvCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        KvCommand::Set { key, value } => kv_set(state, &key, &value, json).await,
        KvCommand::Get { key } => kv_get(state, &key, json).await,
        KvCommand::Delete { key } => kv_delete(state, &key, json).await,
        KvCommand::List => kv_list(state, json).await,
    }
}

/// `squid kv set name Inky` stores the string `"Inky"`, while
/// `squid kv set limits '{"daily":5}'` stores the parsed object.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

async fn kv_set(state: &AppState, key: &str, raw: &str, json: bool) -> Result<()> {
    let value = parse_value(raw);
    state.kv.set(key, &value).await?;

    if json {
        return print_json(&serde_json::json!({ "key": key, "value": value }));
    }
    println!();
    println!("  {} Set '{}'", style("ok").green(), style(key).cyan());
    println!();
    Ok(())
}

async fn kv_get(state: &AppState, key: &str, json: bool) -> Result<()> {
    let value = state.kv.get(key).await?;

    if json {
        return print_json(&serde_json::json!({ "key": key, "value": value }));
    }

    println!();
    match value {
        Some(value) => println!(
            "  {} = {}",
            style(key).cyan().bold(),
            serde_json::to_string_pretty(&value)?
        ),
        None => println!(
            "  {} Key '{}' not found",
            style("i").blue().bold(),
            style(key).cyan()
        ),
    }
    println!();
    Ok(())
}

async fn kv_delete(state: &AppState, key: &str, json: bool) -> Result<()> {
    state.kv.delete(key).await?;

    if json {
        return print_json(&serde_json::json!({ "deleted": key }));
    }
    println!();
    println!("  {} Deleted key '{}'", style("ok").green(), style(key).cyan());
    println!();
    Ok(())
}

async fn kv_list(state: &AppState, json: bool) -> Result<()> {
    let entries = state.kv.list().await?;

    if json {
        return print_json(&entries);
    }

    println!();
    if entries.is_empty() {
        println!("  {} No keys set.", style("i").blue().bold());
        println!("     Set one with: squid kv set <key> <json-value>");
        println!();
        return Ok(());
    }

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Key").fg(Color::White),
        Cell::new("Value Preview").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);
    for entry in &entries {
        table.add_row(vec![
            Cell::new(&entry.key).fg(Color::Cyan),
            Cell::new(truncate(&serde_json::to_string(&entry.value)?, 60)).fg(Color::DarkGrey),
            Cell::new(entry.updated_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");
    println!();
    Ok(())
}
