//! Scrivener Conversation Engine
//!
//! Drives the multi-turn question/answer loop that fills a document's
//! placeholder fields.
//!
//! # Architecture
//!
//! ```text
//!               ┌─ MemoryStore ─ cache (TTL, sliding window)
//!               │        │
//! QuestionGenerator      └─ ConversationLog (durable, append-only)
//!               │
//! ValueValidator ─ LLM extraction + deterministic re-check table
//! ```
//!
//! The memory store is a read-through/write-through view over the durable
//! conversation log: the cache bounds latency and context size, while the
//! log keeps the full transcript recoverable across cold starts.
//!
//! # Key Pieces
//!
//! - [`MemoryStore`]: per-document transcript window with a TTL cache
//! - [`QuestionGenerator`]: next-question and clarification wording
//! - [`ValueValidator`]: free-text reply → normalized value or rejection

#![warn(missing_docs)]

mod error;
mod config;
mod memory;
mod question;
mod validate;

pub use config::MemoryConfig;
pub use error::ConversationError;
pub use memory::{ConversationMemory, MemoryMessage, MemoryStore, NO_HISTORY_SENTINEL};
pub use question::{context_for_placeholder, type_hint, QuestionGenerator};
pub use validate::{
    deterministic_check, ValueValidator, Verdict, GENERIC_FAILURE_REASON, INVALID_SENTINEL,
};
