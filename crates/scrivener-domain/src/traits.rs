//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::document::{Document, DocumentId, DocumentStatus};
use crate::field::{Field, FieldId};
use crate::message::{ConversationMessage, MessageId};

/// Trait for persisting documents
///
/// Implemented by the infrastructure layer (scrivener-store)
pub trait DocumentStore {
    /// Error type for store operations
    type Error;

    /// Persist a new document record
    fn create_document(&mut self, document: Document) -> Result<DocumentId, Self::Error>;

    /// Get a document by ID
    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, Self::Error>;

    /// Update a document's lifecycle status
    ///
    /// Implementations stamp `completed_at` when the status becomes
    /// `Completed`.
    fn update_document_status(
        &mut self,
        id: DocumentId,
        status: DocumentStatus,
    ) -> Result<(), Self::Error>;

    /// Replace a document's extracted text content
    fn update_document_content(&mut self, id: DocumentId, content: &str)
        -> Result<(), Self::Error>;

    /// Record the blob store key of the original file
    fn set_document_blob(&mut self, id: DocumentId, key: &str) -> Result<(), Self::Error>;
}

/// Trait for persisting fields
///
/// Implemented by the infrastructure layer (scrivener-store)
pub trait FieldStore {
    /// Error type for store operations
    type Error;

    /// Persist a new field record
    fn create_field(&mut self, field: Field) -> Result<FieldId, Self::Error>;

    /// List all fields of a document, ordered by fill order then creation
    fn list_fields(&self, document_id: DocumentId) -> Result<Vec<Field>, Self::Error>;

    /// Get a field by ID
    fn get_field(&self, id: FieldId) -> Result<Option<Field>, Self::Error>;

    /// Store an accepted value; also sets the field's status to `Filled`
    fn update_field_value(&mut self, id: FieldId, value: &str) -> Result<(), Self::Error>;

    /// Set the rejected-answer counter
    fn update_field_attempts(&mut self, id: FieldId, attempts: u32) -> Result<(), Self::Error>;

    /// The first pending field in fill order, if any
    fn next_pending_field(&self, document_id: DocumentId) -> Result<Option<Field>, Self::Error>;
}

/// Trait for the append-only conversation log
///
/// Implemented by the infrastructure layer (scrivener-store)
pub trait ConversationLog {
    /// Error type for log operations
    type Error;

    /// Append a message to the durable log
    ///
    /// Implementations must keep creation timestamps strictly monotonic
    /// per document.
    fn append_message(&mut self, message: ConversationMessage) -> Result<MessageId, Self::Error>;

    /// The most recent `limit` messages for a document, newest first
    fn read_recent(
        &self,
        document_id: DocumentId,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>, Self::Error>;

    /// The full transcript for a document, oldest first
    fn read_all(&self, document_id: DocumentId) -> Result<Vec<ConversationMessage>, Self::Error>;
}

/// Logical bucket in the blob store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Uploaded originals, keyed `{document_id}/original.<ext>`
    Original,
    /// Completed artifacts, keyed `{document_id}/completed.<ext>`
    Completed,
}

impl Bucket {
    /// Canonical bucket name
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Original => "original",
            Bucket::Completed => "completed",
        }
    }
}

/// Trait for opaque file storage
///
/// Implemented by the infrastructure layer (scrivener-store)
pub trait BlobStore {
    /// Error type for blob operations
    type Error;

    /// Store bytes under a bucket-scoped key, overwriting any previous value
    fn put_blob(&mut self, bucket: Bucket, key: &str, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Fetch bytes by bucket-scoped key
    fn get_blob(&self, bucket: Bucket, key: &str) -> Result<Vec<u8>, Self::Error>;
}

/// Generation profile selecting a model configuration
///
/// Two logical profiles cover every call the engine makes: question and
/// clarification wording wants a cheap, mildly creative model; placeholder
/// discovery and value extraction want precision at near-zero temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationProfile {
    /// Cheap and fast, moderate creativity (questions, clarifications)
    Light,
    /// Accurate and deterministic (extraction, validation)
    Precise,
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (scrivener-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a text completion under the given profile
    fn generate(&self, prompt: &str, profile: GenerationProfile) -> Result<String, Self::Error>;
}
