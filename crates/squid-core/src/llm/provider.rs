//! LlmProvider trait definition.
//!
//! The one abstraction every language-model backend implements.

use squid_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Implementations
/// live in squid-infra (e.g., `AnthropicProvider`). Timeouts are the
/// implementation's concern and surface as [`LlmError::Timeout`].
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
