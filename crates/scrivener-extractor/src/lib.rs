//! Scrivener Placeholder Extractor
//!
//! Discovers fillable placeholders in a document body.
//!
//! # Overview
//!
//! The Extractor is the entry point of the fill pipeline. It analyzes the
//! raw text of an uploaded template and produces an ordered list of field
//! descriptors: display name, exact placeholder text, semantic type, and
//! fill order, each annotated with an occurrence index so that duplicate
//! placeholder strings stay distinguishable downstream.
//!
//! # Architecture
//!
//! ```text
//! Text → LLM (structured prompt) → parser ┐
//!                                         ├→ occurrence indexer → fields
//! Text → regex fallback scanner ──────────┘
//! ```
//!
//! The LLM path is primary. When the call fails, returns malformed
//! structure, or finds nothing, the regex scanner takes over. When both
//! paths come up empty the document is unprocessable.
//!
//! # Example Usage
//!
//! ```no_run
//! use scrivener_extractor::{ExtractorConfig, PlaceholderExtractor};
//! use scrivener_llm::MockProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("[]");
//! let extractor = PlaceholderExtractor::new(Arc::new(llm), ExtractorConfig::default());
//!
//! let outcome = extractor
//!     .extract("Agreement between [COMPANY] and [EMPLOYEE].")
//!     .await?;
//!
//! for field in &outcome.fields {
//!     println!("{} ({}) -> {}", field.name, field.field_type, field.placeholder);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod types;
mod prompt;
mod parser;
mod fallback;
mod occurrence;
mod extractor;

#[cfg(test)]
mod tests;

pub use error::ExtractError;
pub use config::ExtractorConfig;
pub use types::{ExtractedField, ExtractionOutcome, ExtractionSource, IndexedField};
pub use occurrence::assign_occurrence_indices;
pub use extractor::PlaceholderExtractor;
