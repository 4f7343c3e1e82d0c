//! Document module - the template being filled

use std::fmt;

/// Unique identifier for a document based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability for temporal queries
/// - 128-bit uniqueness
/// - RFC 9562-standard format with broad ecosystem support
/// - No coordination required for distributed generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u128);

impl DocumentId {
    /// Generate a new UUIDv7-based DocumentId
    ///
    /// # Examples
    ///
    /// ```
    /// use scrivener_domain::DocumentId;
    ///
    /// let id = DocumentId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a DocumentId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a DocumentId from a UUIDv7 string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Get the timestamp component of the UUIDv7 (milliseconds since Unix epoch)
    pub fn timestamp(&self) -> u64 {
        // UUIDv7: top 48 bits are Unix millisecond timestamp
        (self.0 >> 80) as u64
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Processing lifecycle of a document
///
/// Statuses form a strict forward progression:
///
/// ```text
/// Uploading → Processing → Ready → Filling → Completed
/// ```
///
/// `Error` is reachable from any non-terminal state and is terminal for
/// that processing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// File bytes are still arriving
    Uploading,
    /// Text extraction and placeholder discovery in progress
    Processing,
    /// Fields identified; conversation can begin
    Ready,
    /// At least one field has been filled
    Filling,
    /// Every field is filled and the completed artifact exists
    Completed,
    /// Processing failed; terminal for this attempt
    Error,
}

impl DocumentStatus {
    /// Canonical string form used by the storage layer
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploading => "uploading",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Ready => "ready",
            DocumentStatus::Filling => "filling",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Error => "error",
        }
    }

    /// Parse the canonical string form
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "uploading" => Ok(DocumentStatus::Uploading),
            "processing" => Ok(DocumentStatus::Processing),
            "ready" => Ok(DocumentStatus::Ready),
            "filling" => Ok(DocumentStatus::Filling),
            "completed" => Ok(DocumentStatus::Completed),
            "error" => Ok(DocumentStatus::Error),
            other => Err(format!("Unknown document status: {}", other)),
        }
    }

    /// Position in the forward progression; `Error` has no rank
    fn rank(&self) -> Option<u8> {
        match self {
            DocumentStatus::Uploading => Some(0),
            DocumentStatus::Processing => Some(1),
            DocumentStatus::Ready => Some(2),
            DocumentStatus::Filling => Some(3),
            DocumentStatus::Completed => Some(4),
            DocumentStatus::Error => None,
        }
    }

    /// Whether this status can legally move to `next`
    ///
    /// Forward moves only; `Error` is reachable from any non-terminal state;
    /// `Completed` and `Error` are terminal.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        match (self.rank(), next.rank()) {
            // Error is terminal
            (None, _) => false,
            // Completed is terminal
            (Some(4), _) => false,
            // Any live state can fail
            (Some(_), None) => true,
            (Some(a), Some(b)) => b > a,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A document - an uploaded template with extracted text content
///
/// The raw file bytes live in the blob store; `original_blob` holds the key.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,

    /// Original filename as uploaded
    pub filename: String,

    /// Current lifecycle status
    pub status: DocumentStatus,

    /// Raw text content extracted from the file
    pub content: String,

    /// Blob store key of the original file, if stored
    pub original_blob: Option<String>,

    /// When this document was created (milliseconds since Unix epoch)
    pub created_at: u64,

    /// When all fields were completed, if they have been
    pub completed_at: Option<u64>,
}

impl Document {
    /// Create a new document in the `Processing` state
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        let id = DocumentId::new();
        Self {
            id,
            filename: filename.into(),
            status: DocumentStatus::Processing,
            content: content.into(),
            original_blob: None,
            created_at: id.timestamp(),
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_ordering() {
        let id1 = DocumentId::from_value(1000);
        let id2 = DocumentId::from_value(2000);

        assert!(id1 < id2);
        assert!(id2 > id1);
    }

    #[test]
    fn test_document_id_display_and_parse() {
        let id = DocumentId::new();
        let id_str = id.to_string();

        assert_eq!(id_str.len(), 36);

        let parsed = DocumentId::from_string(&id_str).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            DocumentStatus::Uploading,
            DocumentStatus::Processing,
            DocumentStatus::Ready,
            DocumentStatus::Filling,
            DocumentStatus::Completed,
            DocumentStatus::Error,
        ] {
            assert_eq!(DocumentStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(DocumentStatus::parse("bogus").is_err());
    }

    #[test]
    fn test_status_forward_progression() {
        assert!(DocumentStatus::Uploading.can_transition_to(DocumentStatus::Processing));
        assert!(DocumentStatus::Processing.can_transition_to(DocumentStatus::Ready));
        assert!(DocumentStatus::Ready.can_transition_to(DocumentStatus::Filling));
        assert!(DocumentStatus::Filling.can_transition_to(DocumentStatus::Completed));
        // Skipping forward is still forward
        assert!(DocumentStatus::Processing.can_transition_to(DocumentStatus::Filling));
    }

    #[test]
    fn test_status_no_backward_moves() {
        assert!(!DocumentStatus::Ready.can_transition_to(DocumentStatus::Processing));
        assert!(!DocumentStatus::Filling.can_transition_to(DocumentStatus::Ready));
        assert!(!DocumentStatus::Ready.can_transition_to(DocumentStatus::Ready));
    }

    #[test]
    fn test_error_reachable_from_live_states() {
        assert!(DocumentStatus::Uploading.can_transition_to(DocumentStatus::Error));
        assert!(DocumentStatus::Processing.can_transition_to(DocumentStatus::Error));
        assert!(DocumentStatus::Filling.can_transition_to(DocumentStatus::Error));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!DocumentStatus::Completed.can_transition_to(DocumentStatus::Error));
        assert!(!DocumentStatus::Error.can_transition_to(DocumentStatus::Processing));
        assert!(!DocumentStatus::Error.can_transition_to(DocumentStatus::Error));
    }

    #[test]
    fn test_new_document_defaults() {
        let doc = Document::new("lease.docx", "Agreement between [A] and [B]");
        assert_eq!(doc.status, DocumentStatus::Processing);
        assert!(doc.original_blob.is_none());
        assert!(doc.completed_at.is_none());
        assert_eq!(doc.created_at, doc.id.timestamp());
    }
}
