//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::fallback::scan_placeholders;
use crate::occurrence::assign_occurrence_indices;
use crate::parser::parse_llm_response;
use crate::prompt::build_extraction_prompt;
use crate::types::{ExtractedField, ExtractionOutcome, ExtractionSource};
use scrivener_domain::traits::{GenerationProfile, LlmProvider};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Extractor discovers fillable placeholders in document text
///
/// The LLM structured-output path runs first; on any failure (call error,
/// malformed structure, empty result) the regex fallback scanner takes
/// over. Both paths feed the occurrence indexer so downstream code never
/// needs to know which one ran.
pub struct PlaceholderExtractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: ExtractorConfig,
}

impl<L> PlaceholderExtractor<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new PlaceholderExtractor
    ///
    /// The provider is shared; orchestration layers reuse the same
    /// provider across extraction, question generation, and validation.
    pub fn new(llm_provider: Arc<L>, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// Extract occurrence-indexed placeholder fields from document text
    ///
    /// # Errors
    ///
    /// - `TextTooLong` when the document exceeds the configured limit
    /// - `NoPlaceholders` when both paths come up empty
    pub async fn extract(&self, document_text: &str) -> Result<ExtractionOutcome, ExtractError> {
        if document_text.len() > self.config.max_text_length {
            return Err(ExtractError::TextTooLong(
                document_text.len(),
                self.config.max_text_length,
            ));
        }

        info!("Starting extraction, text length {}", document_text.len());

        let (fields, source) = match self.extract_with_llm(document_text).await {
            Ok(fields) if !fields.is_empty() => (fields, ExtractionSource::Llm),
            Ok(_) => {
                warn!("LLM extraction found no placeholders, trying fallback scanner");
                (scan_placeholders(document_text), ExtractionSource::Fallback)
            }
            Err(e) => {
                warn!("LLM extraction failed ({}), trying fallback scanner", e);
                (scan_placeholders(document_text), ExtractionSource::Fallback)
            }
        };

        if fields.is_empty() {
            return Err(ExtractError::NoPlaceholders);
        }

        info!("Extraction found {} fields via {:?}", fields.len(), source);

        Ok(ExtractionOutcome {
            fields: assign_occurrence_indices(fields),
            source,
        })
    }

    /// Run the structured-output LLM path
    async fn extract_with_llm(
        &self,
        document_text: &str,
    ) -> Result<Vec<ExtractedField>, ExtractError> {
        let prompt = build_extraction_prompt(document_text);

        debug!("Extraction prompt length: {} chars", prompt.len());

        let response = timeout(self.config.extraction_timeout(), self.call_llm(prompt))
            .await
            .map_err(|_| ExtractError::Timeout)??;

        debug!("LLM response length: {} chars", response.len());

        parse_llm_response(&response)
    }

    /// Call the LLM provider
    async fn call_llm(&self, prompt: String) -> Result<String, ExtractError> {
        let llm = Arc::clone(&self.llm_provider);

        // Call in a blocking context since LlmProvider is not async
        tokio::task::spawn_blocking(move || {
            llm.generate(&prompt, GenerationProfile::Precise)
                .map_err(|e| ExtractError::Llm(e.to_string()))
        })
        .await
        .map_err(|e| ExtractError::Llm(format!("Task join error: {}", e)))?
    }
}
