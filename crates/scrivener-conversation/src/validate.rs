//! Value extraction and validation
//!
//! Two-stage pipeline: the precise LLM profile turns a free-text reply
//! into a normalized value or a sentinel-prefixed rejection, then a
//! deterministic per-type rule table re-checks whatever the model
//! accepted. The deterministic pass can reject a value the model accepted
//! but never overrides a model rejection. A provider failure becomes a
//! rejection with a generic reason, never a hard error: rejection is how
//! the loop asks again.

use crate::memory::ConversationMemory;
use regex::Regex;
use scrivener_domain::traits::{GenerationProfile, LlmProvider};
use scrivener_domain::FieldType;
use std::sync::{Arc, LazyLock};
use tracing::warn;

/// Sentinel prefix marking a model-side rejection
pub const INVALID_SENTINEL: &str = "INVALID:";

/// Rejection reason used when the provider call itself fails
pub const GENERIC_FAILURE_REASON: &str =
    "I couldn't process that response. Could you try rephrasing it?";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});

static DATE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d{1,2}/\d{1,2}/\d{4}",
        r"\d{1,2}-\d{1,2}-\d{4}",
        r"[A-Za-z]+ \d{1,2},? \d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("date pattern"))
    .collect()
});

/// Answers that defer instead of providing a value, always rejected
const REFUSALS: &[&str] = &[
    "i don't know",
    "i dont know",
    "idk",
    "n/a",
    "na",
    "tbd",
    "skip",
    "unknown",
    "not sure",
    "none",
];

/// Outcome of extracting and validating one user reply
///
/// `Rejected` is a normal control-flow outcome meaning "ask again", not an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The normalized value to store
    Accepted {
        /// Normalized field value
        value: String,
    },
    /// The reply did not yield a usable value
    Rejected {
        /// Human-readable reason, forwarded to the clarification generator
        reason: String,
    },
}

/// Turns free-text user replies into validated field values
pub struct ValueValidator<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
}

impl<L> ValueValidator<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new ValueValidator
    pub fn new(llm_provider: Arc<L>) -> Self {
        Self { llm_provider }
    }

    /// Extract a normalized value from a user reply and validate it
    ///
    /// Pure given its inputs; callers persist the attempt counter and
    /// field value.
    pub async fn extract_and_validate(
        &self,
        user_reply: &str,
        field_name: &str,
        field_type: &FieldType,
        placeholder: &str,
        memory: &ConversationMemory,
    ) -> Verdict {
        let prompt = build_extraction_prompt(user_reply, field_name, field_type, placeholder, memory);

        let raw = match self.call_llm(prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Value extraction call failed: {}", e);
                return Verdict::Rejected {
                    reason: GENERIC_FAILURE_REASON.to_string(),
                };
            }
        };

        let raw = raw.trim();

        // The model reply is either a bare value or a sentinel-prefixed
        // rejection; a model rejection is final
        if let Some(reason) = raw.strip_prefix(INVALID_SENTINEL) {
            let reason = reason.trim();
            return Verdict::Rejected {
                reason: if reason.is_empty() {
                    "The response did not contain the required information.".to_string()
                } else {
                    reason.to_string()
                },
            };
        }

        let value = raw.trim_matches('"').trim();

        match deterministic_check(value, field_type) {
            Ok(()) => Verdict::Accepted {
                value: value.to_string(),
            },
            Err(reason) => Verdict::Rejected { reason },
        }
    }

    async fn call_llm(&self, prompt: String) -> Result<String, String> {
        let llm = Arc::clone(&self.llm_provider);

        tokio::task::spawn_blocking(move || {
            llm.generate(&prompt, GenerationProfile::Precise)
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))?
    }
}

fn build_extraction_prompt(
    user_reply: &str,
    field_name: &str,
    field_type: &FieldType,
    placeholder: &str,
    memory: &ConversationMemory,
) -> String {
    format!(
        r#"You are an intelligent field extraction system. Your job is to extract the EXACT value that should fill in the field from the user's response.

Field Details:
- Name: {field_name}
- Type: {field_type}
- Placeholder: {placeholder}

Previous conversation:
{chat_history}

Extraction Rules:
1. Extract ONLY the value that should replace the placeholder
2. Clean up the value (remove extra spaces, fix capitalization of names and organizations)
3. Expand monetary shorthand: "500k" becomes "$500,000", "one million" becomes "$1,000,000"
4. Reject amounts in currencies other than USD
5. Resolve relative dates ("next Friday", "in two weeks") to an explicit date in Month DD, YYYY format; reject dates too vague to resolve ("soon", "sometime next year")
6. For place names, correct misspellings and add the country when it is unambiguous ("Paris" becomes "Paris, France"); reject place names that are internationally ambiguous without more context
7. For addresses, normalize formatting; reject addresses missing required parts (street, city)
8. Lowercase email addresses
9. Preserve the formatting of phone numbers as given
10. For any other type, require non-trivial content
11. Never accept refusals or deferrals ("I don't know", "TBD", "skip") as a value

If the response is ambiguous or doesn't contain the required information, respond with: INVALID: <reason>

Examples:
User says: "My email is John@Example.com"
You respond: john@example.com

User says: "It's due on December 15, 2024"
You respond: December 15, 2024

User says: "around 500k"
You respond: $500,000

User says: "I don't know"
You respond: INVALID: User did not provide a value

Respond with ONLY the extracted value or the INVALID line, nothing else.

Now extract from this user response: "{user_reply}"
"#,
        field_name = field_name,
        field_type = field_type,
        placeholder = placeholder,
        chat_history = memory.render(),
        user_reply = user_reply,
    )
}

/// Re-check a normalized value against the per-type structural rule table
///
/// This pass can reject a value the model accepted; the reverse never
/// happens. Unknown (`Other`) types get the minimal text rule.
pub fn deterministic_check(value: &str, field_type: &FieldType) -> Result<(), String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err("Value cannot be empty".to_string());
    }

    if REFUSALS.contains(&trimmed.to_lowercase().as_str()) {
        return Err("A value is required; the field cannot be skipped".to_string());
    }

    match field_type {
        FieldType::Email => {
            if !EMAIL_RE.is_match(trimmed) {
                return Err(
                    "Please provide a valid email address (e.g., user@example.com)".to_string()
                );
            }
        }
        FieldType::Phone => {
            let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();
            if digits < 10 {
                return Err(
                    "Please provide a valid phone number with at least 10 digits".to_string()
                );
            }
        }
        FieldType::Date => {
            if !DATE_RES.iter().any(|re| re.is_match(trimmed)) {
                return Err(
                    "Please provide a valid date (e.g., 12/31/2024 or December 31, 2024)"
                        .to_string(),
                );
            }
        }
        FieldType::Number | FieldType::Currency | FieldType::Percentage => {
            let cleaned: String = trimmed
                .chars()
                .filter(|c| !matches!(c, '$' | ' ' | ',' | '%'))
                .collect();
            if cleaned.parse::<f64>().is_err() {
                return Err(format!("Please provide a valid {}", field_type));
            }
        }
        FieldType::Name => {
            if trimmed.len() < 2 {
                return Err("Please provide a valid name (at least 2 characters)".to_string());
            }
            if !trimmed.contains(char::is_whitespace) {
                return Err("Please provide both first and last name".to_string());
            }
        }
        FieldType::Text
        | FieldType::Address
        | FieldType::Company
        | FieldType::Other(_) => {
            // Non-empty already checked above
        }
    }

    Ok(())
}
