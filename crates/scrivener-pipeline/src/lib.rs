//! Scrivener Pipeline
//!
//! Orchestrates the full placeholder-fill flow: ingest a template, discover
//! its fields, run the question/answer conversation, and produce the
//! completed document.
//!
//! # Control flow
//!
//! ```text
//! ingest → process_document (deferred) → next_question ⇄ submit_answer → completed
//!                 │                            │               │
//!            extractor +                  memory store     validator +
//!            occurrence indexer           + questions      renderer
//! ```
//!
//! Within one document the turns are logically sequential; across documents
//! everything runs concurrently. The only structure needing explicit mutual
//! exclusion is the conversation memory cache, which guards itself; the
//! stores rely on their own per-row update semantics.
//!
//! # Example Usage
//!
//! ```no_run
//! use scrivener_llm::MockProvider;
//! use scrivener_pipeline::{DocumentPipeline, PipelineConfig};
//! use scrivener_store::{FsBlobStore, SqliteStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("scrivener.db")?;
//! let blobs = FsBlobStore::new("blobs");
//! let llm = MockProvider::new("[]");
//!
//! let pipeline = DocumentPipeline::new(llm, store, blobs, PipelineConfig::default());
//!
//! let document_id = pipeline.ingest("lease.docx", "Rent: $[AMOUNT] due monthly.", None)?;
//! pipeline.process_document(document_id).await?;
//!
//! let next = pipeline.next_question(document_id).await?;
//! println!("{}", next.question);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;
mod types;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::DocumentPipeline;
pub use types::{CompletionSummary, NextQuestion, StatusReport, SubmitOutcome};
