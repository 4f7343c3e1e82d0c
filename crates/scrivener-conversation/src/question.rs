//! Question and clarification generation
//!
//! Wording is delegated to the light LLM profile; every call has a
//! deterministic templated fallback so the conversation loop never stalls
//! on a provider failure.

use crate::memory::ConversationMemory;
use scrivener_domain::traits::{GenerationProfile, LlmProvider};
use scrivener_domain::FieldType;
use std::sync::Arc;
use tracing::warn;

/// Human-readable expected-format hint for a field type
///
/// Unknown types fall through to `"a value"`.
pub fn type_hint(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::Text => "any text value",
        FieldType::Name => "a full name (first and last name)",
        FieldType::Email => "a valid email address",
        FieldType::Phone => "a phone number",
        FieldType::Date => "a date (in format like MM/DD/YYYY or Month Day, Year)",
        FieldType::Number => "a number",
        FieldType::Currency => "a currency amount (e.g., $1,000 or 1000)",
        FieldType::Address => "a complete address",
        FieldType::Company => "a company or organization name",
        FieldType::Percentage => "a percentage value",
        FieldType::Other(_) => "a value",
    }
}

/// Surrounding document text for a placeholder (±`context_chars` characters)
///
/// Grounds question generation in what the document actually says around
/// the blank. Returns an empty string when the placeholder is absent.
pub fn context_for_placeholder(content: &str, placeholder: &str, context_chars: usize) -> String {
    let Some(index) = content.find(placeholder) else {
        return String::new();
    };

    let start = index.saturating_sub(context_chars);
    let end = (index + placeholder.len() + context_chars).min(content.len());

    // Snap to char boundaries so slicing cannot panic on multi-byte text
    let start = (0..=start)
        .rev()
        .find(|&i| content.is_char_boundary(i))
        .unwrap_or(0);
    let end = (end..=content.len())
        .find(|&i| content.is_char_boundary(i))
        .unwrap_or(content.len());

    content[start..end].trim().to_string()
}

/// Generates conversational questions for pending fields
pub struct QuestionGenerator<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
}

impl<L> QuestionGenerator<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new QuestionGenerator
    pub fn new(llm_provider: Arc<L>) -> Self {
        Self { llm_provider }
    }

    /// Generate the next question for a pending field
    ///
    /// `attempt` is 1-based; from attempt 2 on the prompt carries an
    /// explicit retry notice naming the expected format. Pure given its
    /// inputs: callers append the result to memory/log themselves.
    pub async fn generate_question(
        &self,
        field_name: &str,
        field_type: &FieldType,
        placeholder: &str,
        document_context: &str,
        memory: &ConversationMemory,
        attempt: u32,
    ) -> String {
        let hint = type_hint(field_type);
        let retry_notice = if attempt > 1 {
            format!(
                "\n\nI need {}. Please try again with the correct format.",
                hint
            )
        } else {
            String::new()
        };

        let prompt = format!(
            r#"You are a helpful legal document assistant helping users fill in document fields.

Your task is to ask for the field "{field_name}" (placeholder: {placeholder}) in a natural, conversational way.

Field Type: {field_type}
Expected Format: {hint}

Context from document: {document_context}

Previous conversation:
{chat_history}

Guidelines:
1. Be friendly and conversational
2. Keep questions concise and clear
3. For dates, ask in a natural way but mention expected format in parentheses
4. Don't repeat information the user has already provided
5. If this is a retry (attempt {attempt}), politely point out what format is needed{retry_notice}

Generate ONLY the question to ask the user, nothing else."#,
            field_name = field_name,
            placeholder = placeholder,
            field_type = field_type,
            hint = hint,
            document_context = document_context,
            chat_history = memory.render(),
            attempt = attempt,
            retry_notice = retry_notice,
        );

        match self.call_llm(prompt).await {
            Ok(question) => question.trim().trim_matches(['"', '\'']).to_string(),
            Err(e) => {
                warn!("Question generation failed ({}), using template", e);
                format!("What is the {}?", field_name)
            }
        }
    }

    /// Generate a friendly clarification when an answer was rejected
    pub async fn generate_clarification(
        &self,
        field_name: &str,
        field_type: &FieldType,
        rejection_reason: &str,
        user_reply: &str,
        memory: &ConversationMemory,
    ) -> String {
        let prompt = format!(
            r#"You are a helpful assistant. The user tried to provide a value for "{field_name}" but there was an issue.

User's response: {user_reply}
Issue: {rejection_reason}
Field type: {field_type}

Previous conversation:
{chat_history}

Generate a friendly, conversational message that:
1. Acknowledges their response
2. Explains what format is needed
3. Asks them to try again

Be warm and encouraging. Don't be robotic. Generate ONLY the clarification message."#,
            field_name = field_name,
            user_reply = user_reply,
            rejection_reason = rejection_reason,
            field_type = field_type,
            chat_history = memory.render(),
        );

        match self.call_llm(prompt).await {
            Ok(clarification) => clarification.trim().to_string(),
            Err(e) => {
                warn!("Clarification generation failed ({}), using template", e);
                format!(
                    "I need {} for {}. {} Please try again.",
                    type_hint(field_type),
                    field_name,
                    rejection_reason
                )
            }
        }
    }

    async fn call_llm(&self, prompt: String) -> Result<String, String> {
        let llm = Arc::clone(&self.llm_provider);

        tokio::task::spawn_blocking(move || {
            llm.generate(&prompt, GenerationProfile::Light)
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::MessageRole;
    use scrivener_llm::MockProvider;

    #[test]
    fn test_type_hint_table() {
        assert_eq!(type_hint(&FieldType::Email), "a valid email address");
        assert_eq!(
            type_hint(&FieldType::Currency),
            "a currency amount (e.g., $1,000 or 1000)"
        );
        assert_eq!(
            type_hint(&FieldType::Other("jurisdiction".to_string())),
            "a value"
        );
    }

    #[test]
    fn test_context_window_around_placeholder() {
        let content = format!("{}[DATE]{}", "a".repeat(500), "b".repeat(500));
        let context = context_for_placeholder(&content, "[DATE]", 200);
        assert_eq!(context.len(), 200 + "[DATE]".len() + 200);
        assert!(context.contains("[DATE]"));
    }

    #[test]
    fn test_context_clamped_at_document_edges() {
        let context = context_for_placeholder("Start: [DATE].", "[DATE]", 200);
        assert_eq!(context, "Start: [DATE].");
    }

    #[test]
    fn test_context_missing_placeholder() {
        assert_eq!(context_for_placeholder("no blanks", "[DATE]", 200), "");
    }

    #[test]
    fn test_context_survives_multibyte_neighbors() {
        let content = format!("{}[DATE]{}", "é".repeat(300), "ü".repeat(300));
        let context = context_for_placeholder(&content, "[DATE]", 200);
        assert!(context.contains("[DATE]"));
    }

    #[tokio::test]
    async fn test_generated_question_returned() {
        let mut provider = MockProvider::default();
        provider.add_response("Start Date", "When does the agreement start? (MM/DD/YYYY)");
        let generator = QuestionGenerator::new(Arc::new(provider));

        let question = generator
            .generate_question(
                "Start Date",
                &FieldType::Date,
                "[START_DATE]",
                "Start: [START_DATE].",
                &ConversationMemory::new(),
                1,
            )
            .await;

        assert_eq!(question, "When does the agreement start? (MM/DD/YYYY)");
    }

    #[tokio::test]
    async fn test_template_fallback_on_llm_failure() {
        let generator = QuestionGenerator::new(Arc::new(MockProvider::failing()));

        let question = generator
            .generate_question(
                "Company Name",
                &FieldType::Company,
                "[COMPANY]",
                "",
                &ConversationMemory::new(),
                1,
            )
            .await;

        assert_eq!(question, "What is the Company Name?");
    }

    #[tokio::test]
    async fn test_clarification_fallback_names_reason() {
        let generator = QuestionGenerator::new(Arc::new(MockProvider::failing()));

        let mut memory = ConversationMemory::new();
        memory.push(MessageRole::Human, "soon");

        let clarification = generator
            .generate_clarification(
                "Start Date",
                &FieldType::Date,
                "The date is too vague.",
                "soon",
                &memory,
            )
            .await;

        assert!(clarification.contains("The date is too vague."));
        assert!(clarification.contains("Start Date"));
    }
}
