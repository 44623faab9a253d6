use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in squid-core).
///
/// Absence is never an error here: lookups return `Option`, and deletes of
/// missing rows succeed.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while requesting or recording a security scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("free scan quota exhausted ({used}/{allowed} used)")]
    QuotaExceeded { used: u32, allowed: u32 },

    #[error("no repository configured for scanning")]
    MissingTarget,

    #[error("scanner unavailable: {0}")]
    Scanner(String),

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Stable category of a language-model failure.
///
/// Each category carries a fixed, user-facing message. The underlying
/// provider error stays attached to [`ChatError::Llm`] for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    AuthFailure,
    RateLimited,
    Overloaded,
    Unknown,
}

impl FailureKind {
    /// Categorize a provider error.
    pub fn classify(err: &LlmError) -> Self {
        match err {
            LlmError::AuthenticationFailed => FailureKind::AuthFailure,
            LlmError::RateLimited { .. } => FailureKind::RateLimited,
            LlmError::Overloaded(_) => FailureKind::Overloaded,
            _ => FailureKind::Unknown,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::AuthFailure => {
                "My Claude API key is invalid. Please check ANTHROPIC_API_KEY in your environment."
            }
            FailureKind::RateLimited => {
                "I'm being rate-limited by the Claude API. Try again in a moment."
            }
            FailureKind::Overloaded => {
                "The Claude API is temporarily overloaded. Try again in a few seconds."
            }
            FailureKind::Unknown => "Something went wrong talking to Claude. Check the logs.",
        }
    }
}

/// Errors from the chat pipeline.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid chat request: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] RepositoryError),

    #[error("{}", kind.user_message())]
    Llm {
        kind: FailureKind,
        #[source]
        source: LlmError,
    },
}

impl From<LlmError> for ChatError {
    fn from(source: LlmError) -> Self {
        ChatError::Llm {
            kind: FailureKind::classify(&source),
            source,
        }
    }
}
