//! Result types exposed to callers

use scrivener_domain::{DocumentStatus, FieldId};

/// The next question to put to the user
#[derive(Debug, Clone, PartialEq)]
pub struct NextQuestion {
    /// Field the question is asking about
    pub field_id: FieldId,

    /// Question text
    pub question: String,
}

/// Outcome of submitting an answer for a field
///
/// A rejected answer is a normal outcome: the conversation stays on the
/// same field and the clarification is the next thing to show the user.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The answer was accepted and stored
    Accepted {
        /// The normalized value that was stored
        value: String,

        /// Question for the next pending field; `None` when the document
        /// is complete
        next_question: Option<NextQuestion>,
    },

    /// The answer was rejected; the same field stays pending
    Rejected {
        /// Why the answer was rejected
        reason: String,

        /// Clarification question to show the user
        clarification: String,

        /// The field still awaiting a valid answer
        field_id: FieldId,
    },
}

/// Processing status of a document with fill progress
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Current lifecycle status
    pub status: DocumentStatus,

    /// Completion percentage (0-100)
    pub progress: u8,

    /// Human-readable status message
    pub message: String,

    /// Number of filled fields
    pub completed_fields: usize,

    /// Total number of fields
    pub total_fields: usize,
}

/// Summary shown when a document's conversation concludes
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSummary {
    /// Original filename
    pub filename: String,

    /// Number of filled fields
    pub fields_completed: usize,

    /// Total number of fields
    pub total_fields: usize,

    /// "N minutes" once completed, "In progress" before that
    pub completion_time: String,
}
