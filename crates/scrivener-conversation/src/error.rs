//! Error types for the conversation engine

use thiserror::Error;

/// Errors that can occur in the conversation engine
///
/// Validation rejections are NOT errors; they are a normal outcome carried
/// by [`crate::Verdict::Rejected`].
#[derive(Error, Debug)]
pub enum ConversationError {
    /// Durable conversation log error
    #[error("Conversation log error: {0}")]
    Log(String),

    /// LLM provider error that could not be degraded to a fallback
    #[error("LLM error: {0}")]
    Llm(String),

    /// A shared lock was poisoned by a panicking thread
    #[error("Lock error: {0}")]
    Lock(String),
}
