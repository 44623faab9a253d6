//! One-shot chat from the command line.

use anyhow::Result;
use console::style;
use squid_types::error::ChatError;

use crate::state::AppState;

/// Send `message` on `channel` and print the reply.
///
/// A model failure prints the stable failure message and is not an error
/// exit: the user turn has already been remembered.
pub async fn send(state: &AppState, channel: &str, message: &str, json: bool) -> Result<()> {
    match state.chat_service.chat(channel, message, None).await {
        Ok(reply) => {
            if json {
                return super::print_json(&reply);
            }
            println!();
            println!(
                "  {} {}",
                style(format!("{}:", state.settings.agent_name)).cyan().bold(),
                reply.reply
            );
            println!();
            println!(
                "  {}",
                style(format!(
                    "{} in / {} out tokens",
                    reply.usage.input_tokens, reply.usage.output_tokens
                ))
                .dim()
            );
            println!();
            Ok(())
        }
        Err(ChatError::Llm { kind, .. }) => {
            if json {
                return super::print_json(&serde_json::json!({
                    "reply": kind.user_message(),
                    "error": true,
                }));
            }
            println!();
            println!("  {} {}", style("!").red().bold(), kind.user_message());
            println!();
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
