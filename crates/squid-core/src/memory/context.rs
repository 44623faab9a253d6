//! Context assembly for a single model request.
//!
//! Produces the ordered turn list for one incoming message:
//!
//! ```text
//! [cross-channel block]   user: "[Context from other channels ...]\n[sms] user: ..."
//!                         assistant: "Noted, I have context from other channels."
//! [same-channel history]  up to N_same - 1 prior turns, oldest first
//! [incoming message]      user: <message>
//! ```
//!
//! The cross-channel block is only emitted for non-primary channels and only
//! when at least one record from another channel exists.

use squid_types::config::MemorySettings;
use squid_types::error::RepositoryError;
use squid_types::llm::Message;
use squid_types::memory::{MemoryRecord, MessageRole, NewMemoryRecord, RecordMetadata};
use tracing::debug;

use super::store::MemoryRepository;

pub const CROSS_CHANNEL_HEADER: &str = "[Context from other channels for reference]";
pub const CROSS_CHANNEL_ACK: &str = "Noted, I have context from other channels.";

/// Window sizes and the primary channel name.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub same_channel_limit: u32,
    pub cross_channel_limit: u32,
    pub primary_channel: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self::from(&MemorySettings::default())
    }
}

impl From<&MemorySettings> for ContextConfig {
    fn from(settings: &MemorySettings) -> Self {
        Self {
            same_channel_limit: settings.same_channel_limit,
            cross_channel_limit: settings.cross_channel_limit,
            primary_channel: settings.primary_channel.clone(),
        }
    }
}

/// Output of [`ContextAssembler::assemble`].
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// Turns ready for submission; the last one is always the incoming message.
    pub messages: Vec<Message>,
    /// Id of the user record persisted for the incoming message.
    pub user_record_id: i64,
}

/// Builds bounded conversational context from the memory log.
pub struct ContextAssembler<M: MemoryRepository> {
    repo: M,
    config: ContextConfig,
}

impl<M: MemoryRepository> ContextAssembler<M> {
    pub fn new(repo: M, config: ContextConfig) -> Self {
        Self { repo, config }
    }

    pub fn repo(&self) -> &M {
        &self.repo
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Persist `incoming` as a user turn on `channel`, then build the turn
    /// list around it.
    ///
    /// The user record is durable before this returns, so a later model
    /// failure leaves it in the log. `channel` is trimmed the same way the
    /// store trims it, so history and the cross-channel filter see the stored
    /// name.
    pub async fn assemble(
        &self,
        channel: &str,
        incoming: &str,
        metadata: Option<RecordMetadata>,
    ) -> Result<AssembledContext, RepositoryError> {
        let channel = channel.trim();
        if channel.is_empty() {
            return Err(RepositoryError::InvalidInput("channel must not be empty".into()));
        }

        let mut new_record = NewMemoryRecord::new(channel, MessageRole::User, incoming);
        new_record.metadata = metadata;
        let user_record = self.repo.append(&new_record).await?;

        let history = self
            .repo
            .recent(channel, self.config.same_channel_limit)
            .await?;

        let cross = if channel != self.config.primary_channel {
            self.repo
                .recent_across_channels(self.config.cross_channel_limit)
                .await?
                .into_iter()
                .filter(|r| r.channel != channel)
                .collect()
        } else {
            Vec::new()
        };

        let mut messages = Vec::with_capacity(history.len() + 3);
        if let Some(block) = render_cross_channel(&cross) {
            messages.push(Message::user(block));
            messages.push(Message::assistant(CROSS_CHANNEL_ACK));
        }
        messages.extend(
            history
                .iter()
                .filter(|r| r.id != user_record.id)
                .map(|r| Message {
                    role: r.role,
                    content: r.content.clone(),
                }),
        );
        messages.push(Message::user(incoming));

        debug!(
            channel,
            record_id = user_record.id,
            history = history.len(),
            cross_channel = cross.len(),
            turns = messages.len(),
            "Assembled context"
        );

        Ok(AssembledContext {
            messages,
            user_record_id: user_record.id,
        })
    }
}

/// Render cross-channel records as one contextual block, or `None` if empty.
fn render_cross_channel(records: &[MemoryRecord]) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    let lines: Vec<String> = records
        .iter()
        .map(|r| format!("[{}] {}: {}", r.channel, r.role, r.content))
        .collect();
    Some(format!("{CROSS_CHANNEL_HEADER}\n{}", lines.join("\n")))
}
