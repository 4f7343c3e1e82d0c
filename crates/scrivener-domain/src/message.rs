//! Conversation message module - the append-only dialogue log

use crate::document::DocumentId;
use crate::field::FieldId;
use std::fmt;

/// Unique identifier for a conversation message based on UUIDv7
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u128);

impl MessageId {
    /// Generate a new UUIDv7-based MessageId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a MessageId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Get the timestamp component of the UUIDv7 (milliseconds since Unix epoch)
    pub fn timestamp(&self) -> u64 {
        (self.0 >> 80) as u64
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// The user filling the document
    Human,
    /// The assistant asking questions
    Assistant,
}

impl MessageRole {
    /// Canonical string form used by the storage layer
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::Human => "human",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Parse the canonical string form
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "human" => Ok(MessageRole::Human),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("Unknown message role: {}", other)),
        }
    }
}

/// One turn of the fill conversation
///
/// Messages are append-only: never mutated or deleted. Ordering is by
/// creation timestamp, which the storage layer keeps strictly monotonic
/// per document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationMessage {
    /// Unique identifier
    pub id: MessageId,

    /// Owning document
    pub document_id: DocumentId,

    /// Author of the message
    pub role: MessageRole,

    /// Message text
    pub content: String,

    /// The field this message was asking about or answering, if any
    pub field_id: Option<FieldId>,

    /// When this message was created (milliseconds since Unix epoch)
    pub created_at: u64,
}

impl ConversationMessage {
    /// Create a new message stamped with its id's UUIDv7 timestamp
    pub fn new(
        document_id: DocumentId,
        role: MessageRole,
        content: impl Into<String>,
        field_id: Option<FieldId>,
    ) -> Self {
        let id = MessageId::new();
        Self {
            id,
            document_id,
            role,
            content: content.into(),
            field_id,
            created_at: id.timestamp(),
        }
    }
}
