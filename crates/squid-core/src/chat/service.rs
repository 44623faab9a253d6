//! Chat service: one incoming message in, one reply out.
//!
//! Order of effects for a single call:
//! 1. the user turn is appended to memory (durable)
//! 2. context is assembled around it
//! 3. the model is called, with no lock held
//! 4. the assistant turn is appended with its token counts
//!
//! A failure at step 3 leaves the user turn in place; nothing is rolled back.

use serde::Serialize;
use squid_types::error::ChatError;
use squid_types::llm::{CompletionRequest, Usage};
use squid_types::memory::{MessageRole, NewMemoryRecord, RecordMetadata};
use tracing::{Instrument, error, info, info_span, warn};

use crate::agent::prompt::SystemPromptBuilder;
use crate::llm::box_provider::BoxLlmProvider;
use crate::memory::context::ContextAssembler;
use crate::memory::store::MemoryRepository;
use crate::skill::SkillRepository;

/// Model parameters and identity used for every request.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub agent_name: String,
    pub model: String,
    pub max_tokens: u32,
    pub free_scans: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub usage: Usage,
}

/// Orchestrates memory, context assembly, and the model call.
///
/// Generic over `MemoryRepository` and `SkillRepository` to maintain clean
/// architecture (squid-core never depends on squid-infra).
pub struct ChatService<M: MemoryRepository, K: SkillRepository> {
    assembler: ContextAssembler<M>,
    skills: K,
    provider: BoxLlmProvider,
    options: ChatOptions,
}

impl<M: MemoryRepository, K: SkillRepository> ChatService<M, K> {
    pub fn new(
        assembler: ContextAssembler<M>,
        skills: K,
        provider: BoxLlmProvider,
        options: ChatOptions,
    ) -> Self {
        Self {
            assembler,
            skills,
            provider,
            options,
        }
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Build the system preamble from the agent name and installed skills.
    ///
    /// A failing skill lookup degrades to an empty skill list.
    pub async fn system_prompt(&self) -> String {
        let skills = match self.skills.list().await {
            Ok(skills) => skills,
            Err(e) => {
                warn!(error = %e, "Failed to load skills for system prompt");
                Vec::new()
            }
        };
        SystemPromptBuilder::build(&self.options.agent_name, &skills, self.options.free_scans)
    }

    /// Handle one incoming message on `channel`.
    pub async fn chat(
        &self,
        channel: &str,
        message: &str,
        metadata: Option<RecordMetadata>,
    ) -> Result<ChatReply, ChatError> {
        let channel = channel.trim();
        if channel.is_empty() {
            return Err(ChatError::InvalidInput("channel must not be empty".into()));
        }
        if message.trim().is_empty() {
            return Err(ChatError::InvalidInput("message must not be empty".into()));
        }

        let context = self.assembler.assemble(channel, message, metadata).await?;

        let request = CompletionRequest {
            model: self.options.model.clone(),
            messages: context.messages,
            system: Some(self.system_prompt().await),
            max_tokens: self.options.max_tokens,
            temperature: None,
        };

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            channel = %channel,
        );

        let response = match self.provider.complete(&request).instrument(span).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    channel = %channel,
                    user_record_id = context.user_record_id,
                    error = %e,
                    "Model call failed"
                );
                return Err(ChatError::from(e));
            }
        };

        let metadata = RecordMetadata::completion(
            response.model.clone(),
            u64::from(response.usage.input_tokens),
            u64::from(response.usage.output_tokens),
            response.stop_reason.to_string(),
        );
        let record = self
            .assembler
            .repo()
            .append(
                &NewMemoryRecord::new(channel, MessageRole::Assistant, response.content.clone())
                    .with_metadata(metadata),
            )
            .await?;

        info!(
            channel = %channel,
            record_id = record.id,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Reply recorded"
        );

        Ok(ChatReply {
            reply: response.content,
            usage: response.usage,
        })
    }
}
