//! Core pipeline orchestration

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::types::{CompletionSummary, NextQuestion, StatusReport, SubmitOutcome};
use scrivener_conversation::{
    context_for_placeholder, MemoryStore, QuestionGenerator, ValueValidator, Verdict,
};
use scrivener_domain::traits::{
    BlobStore, Bucket, ConversationLog, DocumentStore, FieldStore, LlmProvider,
};
use scrivener_domain::{
    ConversationMessage, Document, DocumentId, DocumentStatus, Field, FieldId, FieldStatus,
    MessageRole,
};
use scrivener_extractor::PlaceholderExtractor;
use scrivener_renderer::{render_completed, render_preview};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Orchestrates the placeholder-fill flow for documents
///
/// Generic over the LLM provider, a unified store implementing the three
/// store traits, and a blob store. Holds each behind its own handle; the
/// conversation memory cache does its own locking.
pub struct DocumentPipeline<L, S, B>
where
    L: LlmProvider,
    S: DocumentStore + FieldStore + ConversationLog,
    B: BlobStore,
{
    store: Arc<Mutex<S>>,
    blobs: Arc<Mutex<B>>,
    extractor: PlaceholderExtractor<L>,
    memory: MemoryStore<S>,
    questions: QuestionGenerator<L>,
    validator: ValueValidator<L>,
    config: PipelineConfig,
}

impl<L, S, B> DocumentPipeline<L, S, B>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
    S: DocumentStore + FieldStore + ConversationLog + Send + 'static,
    <S as DocumentStore>::Error: std::fmt::Display,
    <S as FieldStore>::Error: std::fmt::Display,
    <S as ConversationLog>::Error: std::fmt::Display,
    B: BlobStore + Send + 'static,
    <B as BlobStore>::Error: std::fmt::Display,
{
    /// Create a new pipeline
    pub fn new(llm: L, store: S, blobs: B, config: PipelineConfig) -> Self {
        let llm = Arc::new(llm);
        let store = Arc::new(Mutex::new(store));

        Self {
            extractor: PlaceholderExtractor::new(Arc::clone(&llm), config.extractor.clone()),
            memory: MemoryStore::new(Arc::clone(&store), config.memory.clone()),
            questions: QuestionGenerator::new(Arc::clone(&llm)),
            validator: ValueValidator::new(llm),
            blobs: Arc::new(Mutex::new(blobs)),
            store,
            config,
        }
    }

    /// Register an uploaded template and store its original bytes
    ///
    /// The document starts in `Processing`; placeholder discovery itself
    /// runs in [`Self::process_document`], typically deferred via
    /// [`Self::spawn_processing`] so the upload response returns promptly.
    pub fn ingest(
        &self,
        filename: &str,
        text: &str,
        original_bytes: Option<&[u8]>,
    ) -> Result<DocumentId, PipelineError> {
        let document = Document::new(filename, text);
        let document_id = document.id;

        {
            let mut store = self.lock_store()?;
            store
                .create_document(document)
                .map_err(|e| PipelineError::Persistence(e.to_string()))?;
        }

        if let Some(bytes) = original_bytes {
            let key = format!("{}/original.{}", document_id, file_extension(filename));
            {
                let mut blobs = self.lock_blobs()?;
                blobs
                    .put_blob(Bucket::Original, &key, bytes)
                    .map_err(|e| PipelineError::Persistence(e.to_string()))?;
            }
            let mut store = self.lock_store()?;
            store
                .set_document_blob(document_id, &key)
                .map_err(|e| PipelineError::Persistence(e.to_string()))?;
        }

        info!("Ingested document {} ({})", document_id, filename);
        Ok(document_id)
    }

    /// Discover placeholders and create the document's fields
    ///
    /// Runs one extraction pass. Extraction failure moves the document to
    /// `Error` and surfaces the cause. Calling this again for a document
    /// that already has fields is rejected: re-extraction could silently
    /// misalign occurrence indices with the document text.
    pub async fn process_document(&self, document_id: DocumentId) -> Result<usize, PipelineError> {
        let document = self.get_document(document_id)?;

        {
            let store = self.lock_store()?;
            let existing = store
                .list_fields(document_id)
                .map_err(|e| PipelineError::Persistence(e.to_string()))?;
            if !existing.is_empty() {
                return Err(PipelineError::Extraction(format!(
                    "document {} already has {} fields; re-extraction is unsupported",
                    document_id,
                    existing.len()
                )));
            }
        }

        let outcome = match self.extractor.extract(&document.content).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Extraction failed for document {}: {}", document_id, e);
                self.set_status(document_id, DocumentStatus::Error)?;
                return Err(PipelineError::Extraction(e.to_string()));
            }
        };

        let count = outcome.fields.len();
        {
            let mut store = self.lock_store()?;
            for indexed in outcome.fields {
                let field = Field::new(
                    document_id,
                    indexed.name,
                    indexed.placeholder,
                    indexed.field_type,
                    indexed.fill_order,
                    indexed.occurrence_index,
                );
                store
                    .create_field(field)
                    .map_err(|e| PipelineError::Persistence(e.to_string()))?;
            }
            store
                .update_document_status(document_id, DocumentStatus::Ready)
                .map_err(|e| PipelineError::Persistence(e.to_string()))?;
        }

        info!(
            "Document {} ready with {} fields (source {:?})",
            document_id, count, outcome.source
        );
        Ok(count)
    }

    /// Run [`Self::process_document`] as deferred background work
    ///
    /// Invoked once per document; failure surfaces via the document's
    /// `Error` status, not via re-invocation.
    pub fn spawn_processing(
        self: &Arc<Self>,
        document_id: DocumentId,
    ) -> tokio::task::JoinHandle<()> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = pipeline.process_document(document_id).await {
                warn!(
                    "Background processing failed for document {}: {}",
                    document_id, e
                );
            }
        })
    }

    /// Generate the next question for the first pending field
    pub async fn next_question(
        &self,
        document_id: DocumentId,
    ) -> Result<NextQuestion, PipelineError> {
        let document = self.get_document(document_id)?;

        let field = {
            let store = self.lock_store()?;
            store
                .next_pending_field(document_id)
                .map_err(|e| PipelineError::Persistence(e.to_string()))?
        }
        .ok_or_else(|| {
            PipelineError::NotFound(format!("no pending fields for document {}", document_id))
        })?;

        let memory = self.memory.load(document_id)?;
        let context = context_for_placeholder(
            &document.content,
            &field.placeholder,
            self.config.context_chars,
        );
        let attempt = field.validation_attempts + 1;

        let question = self
            .questions
            .generate_question(
                &field.name,
                &field.field_type,
                &field.placeholder,
                &context,
                &memory,
                attempt,
            )
            .await;

        self.memory
            .append(document_id, MessageRole::Assistant, &question, Some(field.id))?;

        Ok(NextQuestion {
            field_id: field.id,
            question,
        })
    }

    /// Process a user's answer for a field
    ///
    /// On acceptance the value is stored and the next question (or
    /// completion) follows; on rejection the same field stays pending and
    /// a clarification comes back. Either way the user gets a next thing
    /// to read, never a raw internal failure.
    pub async fn submit_answer(
        &self,
        document_id: DocumentId,
        field_id: FieldId,
        reply: &str,
    ) -> Result<SubmitOutcome, PipelineError> {
        let document = self.get_document(document_id)?;

        let field = {
            let store = self.lock_store()?;
            store
                .get_field(field_id)
                .map_err(|e| PipelineError::Persistence(e.to_string()))?
        }
        .ok_or_else(|| PipelineError::NotFound(format!("field {}", field_id)))?;

        self.memory
            .append(document_id, MessageRole::Human, reply, None)?;
        let memory = self.memory.load(document_id)?;

        let verdict = self
            .validator
            .extract_and_validate(
                reply,
                &field.name,
                &field.field_type,
                &field.placeholder,
                &memory,
            )
            .await;

        match verdict {
            Verdict::Rejected { reason } => {
                let clarification = self
                    .questions
                    .generate_clarification(&field.name, &field.field_type, &reason, reply, &memory)
                    .await;

                self.memory.append(
                    document_id,
                    MessageRole::Assistant,
                    &clarification,
                    Some(field.id),
                )?;

                {
                    let mut store = self.lock_store()?;
                    store
                        .update_field_attempts(field_id, field.validation_attempts + 1)
                        .map_err(|e| PipelineError::Persistence(e.to_string()))?;
                }

                info!(
                    "Rejected answer for field {} ({}): {}",
                    field_id, field.name, reason
                );

                Ok(SubmitOutcome::Rejected {
                    reason,
                    clarification,
                    field_id,
                })
            }
            Verdict::Accepted { value } => {
                {
                    let mut store = self.lock_store()?;
                    store
                        .update_field_value(field_id, &value)
                        .map_err(|e| PipelineError::Persistence(e.to_string()))?;
                    store
                        .update_field_attempts(field_id, 0)
                        .map_err(|e| PipelineError::Persistence(e.to_string()))?;
                }

                if document.status == DocumentStatus::Ready {
                    self.set_status(document_id, DocumentStatus::Filling)?;
                }

                info!("Filled field {} ({})", field_id, field.name);

                let next = {
                    let store = self.lock_store()?;
                    store
                        .next_pending_field(document_id)
                        .map_err(|e| PipelineError::Persistence(e.to_string()))?
                };

                match next {
                    Some(next_field) => {
                        let memory = self.memory.load(document_id)?;
                        let context = context_for_placeholder(
                            &document.content,
                            &next_field.placeholder,
                            self.config.context_chars,
                        );
                        let attempt = next_field.validation_attempts + 1;

                        let question = self
                            .questions
                            .generate_question(
                                &next_field.name,
                                &next_field.field_type,
                                &next_field.placeholder,
                                &context,
                                &memory,
                                attempt,
                            )
                            .await;

                        self.memory.append(
                            document_id,
                            MessageRole::Assistant,
                            &question,
                            Some(next_field.id),
                        )?;

                        Ok(SubmitOutcome::Accepted {
                            value,
                            next_question: Some(NextQuestion {
                                field_id: next_field.id,
                                question,
                            }),
                        })
                    }
                    None => {
                        self.complete_document(&document)?;
                        Ok(SubmitOutcome::Accepted {
                            value,
                            next_question: None,
                        })
                    }
                }
            }
        }
    }

    /// HTML preview with filled and pending fields highlighted
    pub fn preview(&self, document_id: DocumentId) -> Result<String, PipelineError> {
        let document = self.get_document(document_id)?;
        let fields = self.list_fields(document_id)?;
        Ok(render_preview(&document.content, &fields))
    }

    /// The completed document text as bytes
    ///
    /// Served from the blob store when present; otherwise rendered on
    /// demand and stored for next time.
    pub fn completed_document(&self, document_id: DocumentId) -> Result<Vec<u8>, PipelineError> {
        let document = self.get_document(document_id)?;
        let key = format!("{}/completed.txt", document_id);

        {
            let blobs = self.lock_blobs()?;
            if let Ok(bytes) = blobs.get_blob(Bucket::Completed, &key) {
                return Ok(bytes);
            }
        }

        info!(
            "Completed artifact for {} not in storage, rendering on demand",
            document_id
        );
        let fields = self.list_fields(document_id)?;
        let completed = render_completed(&document.content, &fields);

        let mut blobs = self.lock_blobs()?;
        if let Err(e) = blobs.put_blob(Bucket::Completed, &key, completed.as_bytes()) {
            warn!("Failed to store completed artifact for {}: {}", document_id, e);
        }

        Ok(completed.into_bytes())
    }

    /// Processing status with fill progress
    pub fn status(&self, document_id: DocumentId) -> Result<StatusReport, PipelineError> {
        let document = self.get_document(document_id)?;
        let fields = self.list_fields(document_id)?;

        let total_fields = fields.len();
        let completed_fields = fields
            .iter()
            .filter(|f| f.status == FieldStatus::Filled)
            .count();
        let progress = if total_fields > 0 {
            (completed_fields * 100 / total_fields) as u8
        } else {
            0
        };

        let message = match document.status {
            DocumentStatus::Uploading => "Uploading document...".to_string(),
            DocumentStatus::Processing => {
                "Extracting text and identifying placeholders...".to_string()
            }
            DocumentStatus::Ready => "Document is ready for filling".to_string(),
            DocumentStatus::Filling => format!(
                "Filling in progress ({}/{} fields completed)",
                completed_fields, total_fields
            ),
            DocumentStatus::Completed => "All fields completed!".to_string(),
            DocumentStatus::Error => "An error occurred during processing".to_string(),
        };

        Ok(StatusReport {
            status: document.status,
            progress,
            message,
            completed_fields,
            total_fields,
        })
    }

    /// Completion summary for a document
    pub fn summary(&self, document_id: DocumentId) -> Result<CompletionSummary, PipelineError> {
        let document = self.get_document(document_id)?;
        let fields = self.list_fields(document_id)?;

        let completion_time = match document.completed_at {
            Some(done) => {
                let minutes = done.saturating_sub(document.created_at) / 60_000;
                format!("{} minutes", minutes)
            }
            None => "In progress".to_string(),
        };

        Ok(CompletionSummary {
            filename: document.filename,
            fields_completed: fields
                .iter()
                .filter(|f| f.status == FieldStatus::Filled)
                .count(),
            total_fields: fields.len(),
            completion_time,
        })
    }

    /// Full persisted transcript for a document, oldest first
    pub fn history(
        &self,
        document_id: DocumentId,
    ) -> Result<Vec<ConversationMessage>, PipelineError> {
        self.get_document(document_id)?;
        let store = self.lock_store()?;
        store
            .read_all(document_id)
            .map_err(|e| PipelineError::Persistence(e.to_string()))
    }

    /// All fields of a document in fill order
    pub fn fields(&self, document_id: DocumentId) -> Result<Vec<Field>, PipelineError> {
        self.get_document(document_id)?;
        self.list_fields(document_id)
    }

    fn complete_document(&self, document: &Document) -> Result<(), PipelineError> {
        let document_id = document.id;
        self.set_status(document_id, DocumentStatus::Completed)?;

        // The field values are already durable; a blob failure is logged,
        // not surfaced
        let fields = self.list_fields(document_id)?;
        let completed = render_completed(&document.content, &fields);
        let key = format!("{}/completed.txt", document_id);

        match self.lock_blobs() {
            Ok(mut blobs) => {
                if let Err(e) = blobs.put_blob(Bucket::Completed, &key, completed.as_bytes()) {
                    warn!("Failed to store completed artifact for {}: {}", document_id, e);
                }
            }
            Err(e) => warn!("Failed to store completed artifact for {}: {}", document_id, e),
        }

        self.memory.invalidate(document_id)?;
        info!("Document {} completed", document_id);
        Ok(())
    }

    fn get_document(&self, document_id: DocumentId) -> Result<Document, PipelineError> {
        let store = self.lock_store()?;
        store
            .get_document(document_id)
            .map_err(|e| PipelineError::Persistence(e.to_string()))?
            .ok_or_else(|| PipelineError::NotFound(format!("document {}", document_id)))
    }

    fn list_fields(&self, document_id: DocumentId) -> Result<Vec<Field>, PipelineError> {
        let store = self.lock_store()?;
        store
            .list_fields(document_id)
            .map_err(|e| PipelineError::Persistence(e.to_string()))
    }

    fn set_status(
        &self,
        document_id: DocumentId,
        status: DocumentStatus,
    ) -> Result<(), PipelineError> {
        let current = self.get_document(document_id)?.status;
        if !current.can_transition_to(status) {
            warn!(
                "Ignoring illegal status transition {} -> {} for document {}",
                current, status, document_id
            );
            return Ok(());
        }

        let mut store = self.lock_store()?;
        store
            .update_document_status(document_id, status)
            .map_err(|e| PipelineError::Persistence(e.to_string()))
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, S>, PipelineError> {
        self.store
            .lock()
            .map_err(|e| PipelineError::Lock(e.to_string()))
    }

    fn lock_blobs(&self) -> Result<MutexGuard<'_, B>, PipelineError> {
        self.blobs
            .lock()
            .map_err(|e| PipelineError::Lock(e.to_string()))
    }
}

/// File extension for blob keys, defaulting to `docx`
fn file_extension(filename: &str) -> &str {
    filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("docx")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("lease.docx"), "docx");
        assert_eq!(file_extension("contract.v2.doc"), "doc");
        assert_eq!(file_extension("noext"), "docx");
    }
}
