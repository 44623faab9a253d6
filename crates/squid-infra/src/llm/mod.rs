//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](squid_core::llm::provider::LlmProvider)
//! used by the agent (Anthropic Claude) and a small factory that boxes it for
//! the chat service.

pub mod anthropic;

use secrecy::SecretString;
use squid_core::llm::box_provider::BoxLlmProvider;
use squid_types::llm::LlmError;

use self::anthropic::AnthropicProvider;

/// Build the boxed Claude provider.
///
/// A missing key is not an error here: the provider answers every request
/// with [`LlmError::AuthenticationFailed`], which the chat surface turns into
/// the "check ANTHROPIC_API_KEY" reply.
pub fn create_provider(api_key: Option<SecretString>) -> Result<BoxLlmProvider, LlmError> {
    let provider = AnthropicProvider::new(api_key.unwrap_or_else(|| SecretString::from("")))?;
    Ok(BoxLlmProvider::new(provider))
}
