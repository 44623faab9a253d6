//! Token usage summary.

use anyhow::Result;
use console::style;

use super::{format_tokens, print_json};
use crate::state::AppState;

pub async fn usage(state: &AppState, json: bool) -> Result<()> {
    let stats = state.usage.usage().await?;
    if json {
        return print_json(&stats);
    }

    println!();
    println!(
        "  {}",
        style(format!(
            "── Usage (last {} replies) ──",
            state.settings.memory.usage_window
        ))
        .dim()
    );
    println!("  Replies:       {}", style(stats.assistant_message_count).bold());
    println!("  Input tokens:  {}", format_tokens(stats.total_input_tokens));
    println!("  Output tokens: {}", format_tokens(stats.total_output_tokens));
    println!();
    Ok(())
}
