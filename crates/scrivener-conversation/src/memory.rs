//! Conversation memory: a cached sliding window over the durable log
//!
//! Persisted history is unbounded and the durable store is comparatively
//! expensive to query. The cache plus sliding window bounds both latency
//! and context size, while durable append-only writes keep the full
//! transcript recoverable and support cold start and multi-process
//! deployments.

use crate::config::MemoryConfig;
use crate::error::ConversationError;
use scrivener_domain::traits::ConversationLog;
use scrivener_domain::{ConversationMessage, DocumentId, FieldId, MessageRole};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Rendered transcript placeholder when no messages exist yet
pub const NO_HISTORY_SENTINEL: &str = "No previous conversation.";

/// One message of the in-process transcript window
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryMessage {
    /// Author of the message
    pub role: MessageRole,
    /// Message text
    pub content: String,
}

/// Per-document transcript window used as LLM context
///
/// Ordered oldest → newest. This is a *cache* over the durable
/// conversation log, not a source of truth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationMemory {
    messages: Vec<MemoryMessage>,
}

impl ConversationMemory {
    /// Create an empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a memory from messages in chronological order
    pub fn from_messages(messages: Vec<MemoryMessage>) -> Self {
        Self { messages }
    }

    /// Append a message
    pub fn push(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(MemoryMessage {
            role,
            content: content.into(),
        });
    }

    /// The messages, oldest first
    pub fn messages(&self) -> &[MemoryMessage] {
        &self.messages
    }

    /// Whether the memory holds no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages in the window
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Render the transcript as alternating "User:"/"Assistant:" lines
    ///
    /// Returns [`NO_HISTORY_SENTINEL`] when empty.
    pub fn render(&self) -> String {
        if self.messages.is_empty() {
            return NO_HISTORY_SENTINEL.to_string();
        }

        self.messages
            .iter()
            .map(|m| {
                let speaker = match m.role {
                    MessageRole::Human => "User",
                    MessageRole::Assistant => "Assistant",
                };
                format!("{}: {}", speaker, m.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct CacheEntry {
    memory: ConversationMemory,
    touched_at: Instant,
}

/// Cached, write-through view over the durable conversation log
///
/// # Consistency
///
/// - `load` returns the cached window if present and unexpired, otherwise
///   rebuilds it from the last W persisted messages.
/// - `append` writes to the durable log unconditionally, then updates the
///   cache entry if one exists. A cache miss is therefore always safe: it
///   degrades to a rebuild, never to inconsistency of the persisted record.
/// - Expired entries are swept cooperatively on every access; there is no
///   background timer.
///
/// # Concurrency
///
/// The cache is shared mutable state. Every read-modify-write sequence
/// (sweep, lookup, insert/update) runs under one mutex held for the whole
/// sequence, so concurrent requests for the same or different documents
/// cannot interleave mid-operation.
pub struct MemoryStore<C>
where
    C: ConversationLog,
{
    log: Arc<Mutex<C>>,
    cache: Mutex<HashMap<DocumentId, CacheEntry>>,
    config: MemoryConfig,
}

impl<C> MemoryStore<C>
where
    C: ConversationLog,
    C::Error: std::fmt::Display,
{
    /// Create a memory store over a shared conversation log
    pub fn new(log: Arc<Mutex<C>>, config: MemoryConfig) -> Self {
        Self {
            log,
            cache: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Get the transcript window for a document
    ///
    /// Cache hit: returns the cached window and refreshes its TTL.
    /// Cache miss: reads the most recent W persisted messages (newest
    /// first), reverses to chronological order, caches, and returns.
    pub fn load(&self, document_id: DocumentId) -> Result<ConversationMemory, ConversationError> {
        let mut cache = self.lock_cache()?;
        Self::sweep_expired(&mut cache, self.config.ttl());

        if let Some(entry) = cache.get_mut(&document_id) {
            entry.touched_at = Instant::now();
            debug!("Memory cache hit for document {}", document_id);
            return Ok(entry.memory.clone());
        }

        debug!("Memory cache miss for document {}, rebuilding from log", document_id);
        let recent = {
            let log = self
                .log
                .lock()
                .map_err(|e| ConversationError::Lock(e.to_string()))?;
            log.read_recent(document_id, self.config.window)
                .map_err(|e| ConversationError::Log(e.to_string()))?
        };

        let messages = recent
            .into_iter()
            .rev()
            .map(|m| MemoryMessage {
                role: m.role,
                content: m.content,
            })
            .collect();
        let memory = ConversationMemory::from_messages(messages);

        cache.insert(
            document_id,
            CacheEntry {
                memory: memory.clone(),
                touched_at: Instant::now(),
            },
        );

        Ok(memory)
    }

    /// Append a message to the durable log and, if cached, the window
    ///
    /// Safe to call when no cache entry exists; the next `load` will
    /// reconstruct correctly from durable storage.
    pub fn append(
        &self,
        document_id: DocumentId,
        role: MessageRole,
        content: &str,
        field_id: Option<FieldId>,
    ) -> Result<(), ConversationError> {
        let mut cache = self.lock_cache()?;
        Self::sweep_expired(&mut cache, self.config.ttl());

        // Durable write happens unconditionally, before the cache is touched
        {
            let mut log = self
                .log
                .lock()
                .map_err(|e| ConversationError::Lock(e.to_string()))?;
            log.append_message(ConversationMessage::new(
                document_id,
                role,
                content,
                field_id,
            ))
            .map_err(|e| ConversationError::Log(e.to_string()))?;
        }

        if let Some(entry) = cache.get_mut(&document_id) {
            entry.memory.push(role, content);
            // Keep the window sliding in-session too
            while entry.memory.messages.len() > self.config.window {
                entry.memory.messages.remove(0);
            }
            entry.touched_at = Instant::now();
        }

        Ok(())
    }

    /// Evict a document's cache entry (used when its conversation concludes)
    pub fn invalidate(&self, document_id: DocumentId) -> Result<(), ConversationError> {
        let mut cache = self.lock_cache()?;
        Self::sweep_expired(&mut cache, self.config.ttl());
        cache.remove(&document_id);
        Ok(())
    }

    fn lock_cache(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<DocumentId, CacheEntry>>, ConversationError>
    {
        self.cache
            .lock()
            .map_err(|e| ConversationError::Lock(e.to_string()))
    }

    fn sweep_expired(cache: &mut HashMap<DocumentId, CacheEntry>, ttl: Duration) {
        cache.retain(|_, entry| entry.touched_at.elapsed() <= ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::MessageId;

    /// In-memory log for testing
    #[derive(Default)]
    struct VecLog {
        messages: Vec<ConversationMessage>,
    }

    impl ConversationLog for VecLog {
        type Error = String;

        fn append_message(
            &mut self,
            message: ConversationMessage,
        ) -> Result<MessageId, Self::Error> {
            let id = message.id;
            self.messages.push(message);
            Ok(id)
        }

        fn read_recent(
            &self,
            document_id: DocumentId,
            limit: usize,
        ) -> Result<Vec<ConversationMessage>, Self::Error> {
            let mut recent: Vec<ConversationMessage> = self
                .messages
                .iter()
                .filter(|m| m.document_id == document_id)
                .cloned()
                .collect();
            recent.reverse();
            recent.truncate(limit);
            Ok(recent)
        }

        fn read_all(
            &self,
            document_id: DocumentId,
        ) -> Result<Vec<ConversationMessage>, Self::Error> {
            Ok(self
                .messages
                .iter()
                .filter(|m| m.document_id == document_id)
                .cloned()
                .collect())
        }
    }

    fn seeded_log(document_id: DocumentId, count: usize) -> Arc<Mutex<VecLog>> {
        let mut log = VecLog::default();
        for i in 0..count {
            log.append_message(ConversationMessage::new(
                document_id,
                if i % 2 == 0 {
                    MessageRole::Assistant
                } else {
                    MessageRole::Human
                },
                format!("m{}", i + 1),
                None,
            ))
            .unwrap();
        }
        Arc::new(Mutex::new(log))
    }

    #[test]
    fn test_render_empty_is_sentinel() {
        let memory = ConversationMemory::new();
        assert_eq!(memory.render(), NO_HISTORY_SENTINEL);
    }

    #[test]
    fn test_render_alternating_speakers() {
        let mut memory = ConversationMemory::new();
        memory.push(MessageRole::Assistant, "What is the start date?");
        memory.push(MessageRole::Human, "January 1, 2025");

        assert_eq!(
            memory.render(),
            "Assistant: What is the start date?\nUser: January 1, 2025"
        );
    }

    #[test]
    fn test_cold_load_takes_window_in_chronological_order() {
        let document_id = DocumentId::new();
        let log = seeded_log(document_id, 25);
        let store = MemoryStore::new(log, MemoryConfig::default());

        let memory = store.load(document_id).unwrap();

        // Window of 20 over 25 messages: m6..m25, oldest first
        assert_eq!(memory.len(), 20);
        assert_eq!(memory.messages()[0].content, "m6");
        assert_eq!(memory.messages()[19].content, "m25");
    }

    #[test]
    fn test_load_smaller_history_than_window() {
        let document_id = DocumentId::new();
        let log = seeded_log(document_id, 3);
        let store = MemoryStore::new(log, MemoryConfig::default());

        let memory = store.load(document_id).unwrap();
        assert_eq!(memory.len(), 3);
        assert_eq!(memory.messages()[0].content, "m1");
    }

    #[test]
    fn test_append_updates_cache_and_log() {
        let document_id = DocumentId::new();
        let log = seeded_log(document_id, 2);
        let store = MemoryStore::new(Arc::clone(&log), MemoryConfig::default());

        // Warm the cache, then append
        store.load(document_id).unwrap();
        store
            .append(document_id, MessageRole::Human, "my answer", None)
            .unwrap();

        // Cache hit includes the message exactly once
        let memory = store.load(document_id).unwrap();
        let count = memory
            .messages()
            .iter()
            .filter(|m| m.content == "my answer")
            .count();
        assert_eq!(count, 1);

        // Durable log has it too
        assert_eq!(log.lock().unwrap().messages.len(), 3);
    }

    #[test]
    fn test_append_without_cache_entry_is_safe() {
        let document_id = DocumentId::new();
        let log = seeded_log(document_id, 0);
        let store = MemoryStore::new(Arc::clone(&log), MemoryConfig::default());

        // No load first: append goes straight to the durable log
        store
            .append(document_id, MessageRole::Assistant, "first question", None)
            .unwrap();

        // Cold load reconstructs from durable storage, message appears once
        let memory = store.load(document_id).unwrap();
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.messages()[0].content, "first question");
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let document_id = DocumentId::new();
        let log = seeded_log(document_id, 2);
        let store = MemoryStore::new(Arc::clone(&log), MemoryConfig::default());

        store.load(document_id).unwrap();
        store.invalidate(document_id).unwrap();

        // Append while uncached, then reload: the rebuild sees all 3
        store
            .append(document_id, MessageRole::Human, "m3", None)
            .unwrap();
        let memory = store.load(document_id).unwrap();
        assert_eq!(memory.len(), 3);
    }

    #[test]
    fn test_expired_entries_swept_on_access() {
        let document_id = DocumentId::new();
        let log = seeded_log(document_id, 1);
        let config = MemoryConfig {
            window: 20,
            ttl_secs: 0,
        };
        let store = MemoryStore::new(Arc::clone(&log), config);

        store.load(document_id).unwrap();
        std::thread::sleep(Duration::from_millis(5));

        // The entry is past TTL; the next access sweeps and rebuilds
        let memory = store.load(document_id).unwrap();
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_in_session_window_stays_bounded() {
        let document_id = DocumentId::new();
        let log = seeded_log(document_id, 0);
        let config = MemoryConfig {
            window: 4,
            ttl_secs: 3600,
        };
        let store = MemoryStore::new(log, config);

        store.load(document_id).unwrap();
        for i in 0..10 {
            store
                .append(document_id, MessageRole::Human, &format!("m{}", i), None)
                .unwrap();
        }

        let memory = store.load(document_id).unwrap();
        assert_eq!(memory.len(), 4);
        assert_eq!(memory.messages()[3].content, "m9");
    }
}
