//! System status dashboard command.

use anyhow::Result;
use console::style;

use squid_core::memory::store::MemoryRepository;

use super::format_tokens;
use crate::state::AppState;

/// Display the system status dashboard.
///
/// Shows the agent identity, memory and usage totals, the security posture,
/// and which channels are configured.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let memory = state.memory.stats().await?;
    let usage = state.usage.usage().await?;
    let ledger = state.scan_service.ledger();
    let latest = ledger.latest().await?;
    let quota = ledger.quota().await?;
    let channels = state.channels;

    if json {
        let status = serde_json::json!({
            "agent": state.settings.agent_name,
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "model": state.settings.claude.model,
            "memory": memory,
            "usage": usage,
            "trust_score": latest.as_ref().map(|s| s.trust_score),
            "scans": quota,
            "channels": channels,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} v{}",
        style("🦑").bold(),
        style(&state.settings.agent_name).cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Memory ──").dim());
    println!("  Records:  {}", style(memory.total).bold());
    println!("  Channels: {}", memory.channels.len());
    println!();

    println!("  {}", style("── Usage ──").dim());
    println!("  Model:         {}", state.settings.claude.model);
    println!("  Replies:       {}", usage.assistant_message_count);
    println!(
        "  Tokens used:   {}",
        format_tokens(usage.total_input_tokens + usage.total_output_tokens)
    );
    println!();

    println!("  {}", style("── Security ──").dim());
    match &latest {
        Some(scan) => println!(
            "  Trust score: {}/100 ({})",
            style(scan.trust_score).bold(),
            scan.result
        ),
        None => println!("  Trust score: {}", style("no scans yet").dim()),
    }
    println!("  Free scans:  {} of {} left", quota.remaining, quota.allowed);
    println!();

    let mark = |on: bool| {
        if on {
            format!("{}", style("✓").green())
        } else {
            format!("{}", style("✗").red())
        }
    };
    println!("  {}", style("── Channels ──").dim());
    println!("  {} SMS", mark(channels.sms));
    println!("  {} X", mark(channels.x));
    println!("  {} Moltbook", mark(channels.moltbook));
    println!("  {} SquidBay", mark(channels.squidbay));
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style("SQLite (WAL mode)").dim());
    println!();

    Ok(())
}
