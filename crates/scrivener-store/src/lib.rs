//! Scrivener Storage Layer
//!
//! Implements the document, field, and conversation-log store traits using
//! SQLite, plus a filesystem-backed blob store for original and completed
//! document files.
//!
//! # Architecture
//!
//! - SQLite for structured data (documents, fields, conversation messages)
//! - One store type implements all three store traits so orchestration can
//!   hold a single handle
//! - A directory tree for blobs, one subdirectory per logical bucket
//!
//! # Examples
//!
//! ```no_run
//! use scrivener_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for document/field/message operations
//! ```

#![warn(missing_docs)]

mod blob;

use rusqlite::{params, Connection, OptionalExtension};
use scrivener_domain::traits::{ConversationLog, DocumentStore, FieldStore};
use scrivener_domain::{
    ConversationMessage, Document, DocumentId, DocumentStatus, Field, FieldId, FieldStatus,
    FieldType, MessageId, MessageRole,
};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub use blob::FsBlobStore;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error (blob store)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Current wall-clock time in milliseconds since Unix epoch
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// SQLite-based implementation of the three store traits
///
/// Provides persistent storage for documents, fields, and conversation
/// messages.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Callers share a store across
/// tasks behind a mutex.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use scrivener_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("scrivener.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert a u128 identifier to bytes for storage
    fn id_to_bytes(value: u128) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }

    /// Convert stored bytes back to a u128 identifier
    fn bytes_to_id(bytes: &[u8]) -> Result<u128, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for identifier, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(u128::from_be_bytes(arr))
    }

    fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_id(&id_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
        })?;
        let status_str: String = row.get(2)?;
        let status = DocumentStatus::parse(&status_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(StoreError::InvalidData(e)),
            )
        })?;
        let completed_at: Option<i64> = row.get(6)?;

        Ok(Document {
            id: DocumentId::from_value(id),
            filename: row.get(1)?,
            status,
            content: row.get(3)?,
            original_blob: row.get(4)?,
            created_at: row.get::<_, i64>(5)? as u64,
            completed_at: completed_at.map(|t| t as u64),
        })
    }

    fn row_to_field(row: &rusqlite::Row<'_>) -> rusqlite::Result<Field> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let doc_bytes: Vec<u8> = row.get(1)?;
        let id = Self::bytes_to_id(&id_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
        })?;
        let document_id = Self::bytes_to_id(&doc_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Blob, Box::new(e))
        })?;
        let type_str: String = row.get(4)?;
        let status_str: String = row.get(8)?;
        let status = FieldStatus::parse(&status_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                8,
                rusqlite::types::Type::Text,
                Box::new(StoreError::InvalidData(e)),
            )
        })?;

        Ok(Field {
            id: FieldId::from_value(id),
            document_id: DocumentId::from_value(document_id),
            name: row.get(2)?,
            placeholder: row.get(3)?,
            field_type: FieldType::parse(&type_str),
            fill_order: row.get(5)?,
            occurrence_index: row.get::<_, i64>(6)? as u32,
            value: row.get(7)?,
            status,
            validation_attempts: row.get::<_, i64>(9)? as u32,
            created_at: row.get::<_, i64>(10)? as u64,
        })
    }

    fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationMessage> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let doc_bytes: Vec<u8> = row.get(1)?;
        let id = Self::bytes_to_id(&id_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
        })?;
        let document_id = Self::bytes_to_id(&doc_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Blob, Box::new(e))
        })?;
        let role_str: String = row.get(2)?;
        let role = MessageRole::parse(&role_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(StoreError::InvalidData(e)),
            )
        })?;
        let field_bytes: Option<Vec<u8>> = row.get(4)?;
        let field_id = match field_bytes {
            Some(bytes) => Some(FieldId::from_value(Self::bytes_to_id(&bytes).map_err(
                |e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        4,
                        rusqlite::types::Type::Blob,
                        Box::new(e),
                    )
                },
            )?)),
            None => None,
        };

        Ok(ConversationMessage {
            id: MessageId::from_value(id),
            document_id: DocumentId::from_value(document_id),
            role,
            content: row.get(3)?,
            field_id,
            created_at: row.get::<_, i64>(5)? as u64,
        })
    }
}

impl DocumentStore for SqliteStore {
    type Error = StoreError;

    fn create_document(&mut self, document: Document) -> Result<DocumentId, Self::Error> {
        self.conn.execute(
            "INSERT INTO documents (id, filename, status, content, original_blob, created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                Self::id_to_bytes(document.id.value()),
                &document.filename,
                document.status.as_str(),
                &document.content,
                &document.original_blob,
                document.created_at as i64,
                document.completed_at.map(|t| t as i64),
            ],
        )?;
        Ok(document.id)
    }

    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, Self::Error> {
        let document = self
            .conn
            .query_row(
                "SELECT id, filename, status, content, original_blob, created_at, completed_at
                 FROM documents WHERE id = ?1",
                params![Self::id_to_bytes(id.value())],
                Self::row_to_document,
            )
            .optional()?;
        Ok(document)
    }

    fn update_document_status(
        &mut self,
        id: DocumentId,
        status: DocumentStatus,
    ) -> Result<(), Self::Error> {
        let completed_at = if status == DocumentStatus::Completed {
            Some(now_millis() as i64)
        } else {
            None
        };

        let updated = self.conn.execute(
            "UPDATE documents SET status = ?2, completed_at = COALESCE(?3, completed_at)
             WHERE id = ?1",
            params![
                Self::id_to_bytes(id.value()),
                status.as_str(),
                completed_at
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("document {}", id)));
        }
        Ok(())
    }

    fn update_document_content(
        &mut self,
        id: DocumentId,
        content: &str,
    ) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE documents SET content = ?2 WHERE id = ?1",
            params![Self::id_to_bytes(id.value()), content],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("document {}", id)));
        }
        Ok(())
    }

    fn set_document_blob(&mut self, id: DocumentId, key: &str) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE documents SET original_blob = ?2 WHERE id = ?1",
            params![Self::id_to_bytes(id.value()), key],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("document {}", id)));
        }
        Ok(())
    }
}

impl FieldStore for SqliteStore {
    type Error = StoreError;

    fn create_field(&mut self, field: Field) -> Result<FieldId, Self::Error> {
        self.conn.execute(
            "INSERT INTO fields (id, document_id, name, placeholder, field_type, fill_order,
                                 occurrence_index, value, status, validation_attempts, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                Self::id_to_bytes(field.id.value()),
                Self::id_to_bytes(field.document_id.value()),
                &field.name,
                &field.placeholder,
                field.field_type.as_str(),
                field.fill_order,
                field.occurrence_index as i64,
                &field.value,
                field.status.as_str(),
                field.validation_attempts as i64,
                field.created_at as i64,
            ],
        )?;
        Ok(field.id)
    }

    fn list_fields(&self, document_id: DocumentId) -> Result<Vec<Field>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, document_id, name, placeholder, field_type, fill_order,
                    occurrence_index, value, status, validation_attempts, created_at
             FROM fields WHERE document_id = ?1
             ORDER BY fill_order ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(
            params![Self::id_to_bytes(document_id.value())],
            Self::row_to_field,
        )?;
        let mut fields = Vec::new();
        for row in rows {
            fields.push(row?);
        }
        Ok(fields)
    }

    fn get_field(&self, id: FieldId) -> Result<Option<Field>, Self::Error> {
        let field = self
            .conn
            .query_row(
                "SELECT id, document_id, name, placeholder, field_type, fill_order,
                        occurrence_index, value, status, validation_attempts, created_at
                 FROM fields WHERE id = ?1",
                params![Self::id_to_bytes(id.value())],
                Self::row_to_field,
            )
            .optional()?;
        Ok(field)
    }

    fn update_field_value(&mut self, id: FieldId, value: &str) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE fields SET value = ?2, status = ?3 WHERE id = ?1",
            params![
                Self::id_to_bytes(id.value()),
                value,
                FieldStatus::Filled.as_str()
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("field {}", id)));
        }
        Ok(())
    }

    fn update_field_attempts(&mut self, id: FieldId, attempts: u32) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE fields SET validation_attempts = ?2 WHERE id = ?1",
            params![Self::id_to_bytes(id.value()), attempts as i64],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("field {}", id)));
        }
        Ok(())
    }

    fn next_pending_field(&self, document_id: DocumentId) -> Result<Option<Field>, Self::Error> {
        let field = self
            .conn
            .query_row(
                "SELECT id, document_id, name, placeholder, field_type, fill_order,
                        occurrence_index, value, status, validation_attempts, created_at
                 FROM fields WHERE document_id = ?1 AND status = 'pending'
                 ORDER BY fill_order ASC, rowid ASC LIMIT 1",
                params![Self::id_to_bytes(document_id.value())],
                Self::row_to_field,
            )
            .optional()?;
        Ok(field)
    }
}

impl ConversationLog for SqliteStore {
    type Error = StoreError;

    fn append_message(&mut self, message: ConversationMessage) -> Result<MessageId, Self::Error> {
        // Timestamps never regress within a document, even when two appends
        // land in the same millisecond
        let last_ts: Option<i64> = self.conn.query_row(
            "SELECT MAX(created_at) FROM messages WHERE document_id = ?1",
            params![Self::id_to_bytes(message.document_id.value())],
            |row| row.get(0),
        )?;
        let created_at = match last_ts {
            Some(last) => message.created_at.max(last as u64 + 1),
            None => message.created_at,
        };

        self.conn.execute(
            "INSERT INTO messages (id, document_id, role, content, field_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Self::id_to_bytes(message.id.value()),
                Self::id_to_bytes(message.document_id.value()),
                message.role.as_str(),
                &message.content,
                message.field_id.map(|f| Self::id_to_bytes(f.value())),
                created_at as i64,
            ],
        )?;
        Ok(message.id)
    }

    fn read_recent(
        &self,
        document_id: DocumentId,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, document_id, role, content, field_id, created_at
             FROM messages WHERE document_id = ?1
             ORDER BY seq DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(
            params![Self::id_to_bytes(document_id.value()), limit as i64],
            Self::row_to_message,
        )?;
        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    fn read_all(&self, document_id: DocumentId) -> Result<Vec<ConversationMessage>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, document_id, role, content, field_id, created_at
             FROM messages WHERE document_id = ?1
             ORDER BY seq ASC",
        )?;
        let rows = stmt.query_map(
            params![Self::id_to_bytes(document_id.value())],
            Self::row_to_message,
        )?;
        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }
}
