//! Error types for the pipeline

use thiserror::Error;

/// Errors that can occur during pipeline operations
///
/// Validation rejections are NOT represented here; they are the
/// `Rejected` arm of [`crate::SubmitOutcome`] and flow back to the user
/// as a clarification question.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Document or field absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// No placeholders discoverable by either extraction path, or
    /// extraction attempted twice for one document
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// External text-generation call errored with no safe fallback
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Durable store unreachable or erroring; surfaced, not retried
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A shared lock was poisoned by a panicking thread
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<scrivener_conversation::ConversationError> for PipelineError {
    fn from(e: scrivener_conversation::ConversationError) -> Self {
        use scrivener_conversation::ConversationError;
        match e {
            ConversationError::Log(msg) => PipelineError::Persistence(msg),
            ConversationError::Llm(msg) => PipelineError::Generation(msg),
            ConversationError::Lock(msg) => PipelineError::Lock(msg),
        }
    }
}
