//! Field module - one fillable placeholder occurrence

use crate::document::DocumentId;
use std::fmt;

/// Unique identifier for a field based on UUIDv7
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(u128);

impl FieldId {
    /// Generate a new UUIDv7-based FieldId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a FieldId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a FieldId from a UUIDv7 string
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
        (self.0 >> 80) as u64
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Semantic type of a field
///
/// The vocabulary is open at the edges: extraction may label a field with
/// any type string. Known strings map to dedicated variants with dedicated
/// validation rules; anything else is preserved in `Other` and validated
/// with the minimal text rule. Adding a type is one variant plus one
/// validator-table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Free text, minimal validation
    Text,
    /// Calendar date
    Date,
    /// Plain numeric value
    Number,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Postal address
    Address,
    /// Person name
    Name,
    /// Monetary amount
    Currency,
    /// Percentage value
    Percentage,
    /// Company or organization name
    Company,
    /// Any other type string from extraction, validated like text
    Other(String),
}

impl FieldType {
    /// Parse a type string from extraction output (case-insensitive)
    ///
    /// Unknown strings are preserved as `Other`, never rejected.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "text" => FieldType::Text,
            "date" => FieldType::Date,
            "number" => FieldType::Number,
            "email" => FieldType::Email,
            "phone" => FieldType::Phone,
            "address" => FieldType::Address,
            "name" => FieldType::Name,
            "currency" => FieldType::Currency,
            "percentage" => FieldType::Percentage,
            "company" => FieldType::Company,
            _ => FieldType::Other(s.to_ascii_lowercase()),
        }
    }

    /// Canonical string form used by the storage layer and prompts
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Address => "address",
            FieldType::Name => "name",
            FieldType::Currency => "currency",
            FieldType::Percentage => "percentage",
            FieldType::Company => "company",
            FieldType::Other(s) => s,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fill state of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// Awaiting a validated value
    Pending,
    /// Value accepted and stored
    Filled,
}

impl FieldStatus {
    /// Canonical string form used by the storage layer
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::Pending => "pending",
            FieldStatus::Filled => "filled",
        }
    }

    /// Parse the canonical string form
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(FieldStatus::Pending),
            "filled" => Ok(FieldStatus::Filled),
            other => Err(format!("Unknown field status: {}", other)),
        }
    }
}

/// A field - one placeholder occurrence awaiting a value
///
/// Fields are created once at extraction time and mutated only by value
/// updates and status/attempt-counter changes; never deleted in normal
/// operation.
///
/// # Occurrence invariant
///
/// For a fixed document and fixed placeholder text, the occurrence indices
/// across all fields sharing that text are exactly `{0, 1, …, k-1}` with no
/// gaps or repeats. Two fields may have identical `placeholder` strings (two
/// blanks that mean different things); `occurrence_index` is what keeps their
/// rendered positions apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Unique identifier
    pub id: FieldId,

    /// Owning document
    pub document_id: DocumentId,

    /// Human-readable name shown in questions ("Start Date")
    pub name: String,

    /// Exact placeholder text as it appears in the document ("[START_DATE]")
    pub placeholder: String,

    /// Semantic type driving question hints and validation
    pub field_type: FieldType,

    /// Fill order; ties broken by creation order
    pub fill_order: i64,

    /// Zero-based index among fields sharing this placeholder text
    pub occurrence_index: u32,

    /// Accepted value, once filled
    pub value: Option<String>,

    /// Fill state
    pub status: FieldStatus,

    /// Number of rejected answers so far
    pub validation_attempts: u32,

    /// When this field was created (milliseconds since Unix epoch)
    pub created_at: u64,
}

impl Field {
    /// Create a new pending field
    pub fn new(
        document_id: DocumentId,
        name: impl Into<String>,
        placeholder: impl Into<String>,
        field_type: FieldType,
        fill_order: i64,
        occurrence_index: u32,
    ) -> Self {
        let id = FieldId::new();
        Self {
            id,
            document_id,
            name: name.into(),
            placeholder: placeholder.into(),
            field_type,
            fill_order,
            occurrence_index,
            value: None,
            status: FieldStatus::Pending,
            validation_attempts: 0,
            created_at: id.timestamp(),
        }
    }
}
