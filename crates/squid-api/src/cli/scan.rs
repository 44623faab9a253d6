//! Security scan commands: latest, history, quota.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color};
use console::style;

use super::{new_table, print_json};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum ScanCommand {
    /// Show the most recent scan.
    Latest,

    /// Scan summaries, newest first.
    History {
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },

    /// Free manual scans used and remaining.
    Quota,
}

pub async fn handle_scan_command(cmd: ScanCommand, state: &AppState, json: bool) -> Result<()> {
    let ledger = state.scan_service.ledger();
    match cmd {
        ScanCommand::Latest => {
            let latest = ledger.latest().await?;
            if json {
                return print_json(&latest);
            }
            println!();
            match latest {
                Some(scan) => {
                    println!("  {} {}", style("Scan").bold(), style(&scan.id).dim());
                    println!("  Trust score: {}", trust_style(scan.trust_score));
                    println!("  Risk score:  {}", scan.risk_score);
                    println!("  Result:      {}", scan.result);
                    println!("  Trigger:     {}", scan.trigger_type);
                    println!("  Findings:    {}", scan.findings.len());
                    println!("  Files:       {}", scan.files_scanned);
                    println!(
                        "  Scanned at:  {}",
                        scan.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
                    );
                }
                None => println!(
                    "  {} No scans yet. Trigger one with POST /api/v1/scan.",
                    style("i").blue().bold()
                ),
            }
            println!();
            Ok(())
        }
        ScanCommand::History { limit } => {
            let history = ledger.history(limit).await?;
            if json {
                return print_json(&serde_json::json!({
                    "history": history,
                    "total": history.len(),
                }));
            }
            if history.is_empty() {
                println!();
                println!("  {} No scans yet.", style("i").blue().bold());
                println!();
                return Ok(());
            }

            let mut table = new_table();
            table.set_header(vec![
                Cell::new("ID").fg(Color::White),
                Cell::new("Trigger").fg(Color::White),
                Cell::new("Result").fg(Color::White),
                Cell::new("Trust").fg(Color::White),
                Cell::new("Files").fg(Color::White),
                Cell::new("Scanned").fg(Color::White),
            ]);
            for scan in &history {
                let trust = Cell::new(scan.trust_score).fg(if scan.trust_score < ledger.policy().alert_threshold {
                    Color::Red
                } else {
                    Color::Green
                });
                table.add_row(vec![
                    Cell::new(&scan.id).fg(Color::DarkGrey),
                    Cell::new(scan.trigger_type),
                    Cell::new(&scan.result),
                    trust,
                    Cell::new(scan.files_scanned),
                    Cell::new(scan.scanned_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
                ]);
            }
            println!();
            println!("{table}");
            println!();
            Ok(())
        }
        ScanCommand::Quota => {
            let quota = ledger.quota().await?;
            if json {
                return print_json(&quota);
            }
            println!();
            println!(
                "  Free scans: {} of {} used, {} remaining",
                style(quota.used).bold(),
                quota.allowed,
                if quota.remaining == 0 {
                    style(quota.remaining).red().bold()
                } else {
                    style(quota.remaining).green()
                }
            );
            println!();
            Ok(())
        }
    }
}

fn trust_style(score: i64) -> console::StyledObject<String> {
    let text = format!("{score}/100");
    match score {
        80.. => style(text).green().bold(),
        50..=79 => style(text).yellow().bold(),
        _ => style(text).red().bold(),
    }
}
