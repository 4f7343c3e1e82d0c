//! Extraction output types

use scrivener_domain::FieldType;

/// A placeholder descriptor produced by either extraction path
///
/// Not yet occurrence-indexed; see [`crate::assign_occurrence_indices`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedField {
    /// Human-readable name ("Start Date")
    pub name: String,

    /// Exact placeholder text as it appears in the document
    pub placeholder: String,

    /// Semantic type
    pub field_type: FieldType,

    /// Fill order suggested by extraction
    pub fill_order: i64,
}

/// An extracted field annotated with its occurrence index
///
/// The index is zero-based and scoped to the field's exact placeholder
/// text, so descriptors sharing identical text stay distinguishable.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedField {
    /// Human-readable name
    pub name: String,

    /// Exact placeholder text
    pub placeholder: String,

    /// Semantic type
    pub field_type: FieldType,

    /// Fill order
    pub fill_order: i64,

    /// Zero-based index among fields sharing this placeholder text
    pub occurrence_index: u32,
}

/// Which path produced the extraction output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// The structured-output LLM call
    Llm,
    /// The regex fallback scanner
    Fallback,
}

/// Result of a successful extraction
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Occurrence-indexed field descriptors in fill order
    pub fields: Vec<IndexedField>,

    /// Which path produced them
    pub source: ExtractionSource,
}
