//! Scrivener LLM Provider Layer
//!
//! Pluggable LLM provider implementations.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from
//! `scrivener-domain`. Every call site in the engine selects one of two
//! generation profiles: `Light` for conversational wording, `Precise` for
//! extraction and validation. Providers map the profile to a concrete model
//! and temperature.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GeminiProvider`: Google Generative Language API integration
//!
//! # Examples
//!
//! ```
//! use scrivener_llm::MockProvider;
//! use scrivener_domain::traits::{GenerationProfile, LlmProvider};
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt", GenerationProfile::Light).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod gemini;

use scrivener_domain::traits::{GenerationProfile, LlmProvider as LlmProviderTrait};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gemini::GeminiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. It's useful for testing and development.
///
/// # Examples
///
/// ```
/// use scrivener_llm::MockProvider;
/// use scrivener_domain::traits::{GenerationProfile, LlmProvider};
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(
///     provider.generate("any prompt", GenerationProfile::Precise).unwrap(),
///     "Fixed response"
/// );
///
/// // Responses keyed by prompt substring
/// let mut provider = MockProvider::default();
/// provider.add_response("field \"Start Date\"", "When does the lease start?");
/// assert_eq!(
///     provider
///         .generate("ask for field \"Start Date\" now", GenerationProfile::Light)
///         .unwrap(),
///     "When does the lease start?"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Create a MockProvider that fails every call
    ///
    /// Exercises the engine's fallback paths (regex extraction, templated
    /// questions, generic rejection reasons).
    pub fn failing() -> Self {
        Self::new("ERROR")
    }

    /// Add a response for any prompt containing the given fragment
    ///
    /// Engine prompts are long and assembled from many parts, so responses
    /// are matched by substring rather than by the full prompt.
    pub fn add_response(&mut self, prompt_fragment: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt_fragment.into(), response.into());
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }

    /// Configure an error for any prompt containing the given fragment
    pub fn add_error(&mut self, prompt_fragment: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt_fragment.into(), "ERROR".to_string());
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str, _profile: GenerationProfile) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        let responses = self.responses.lock().unwrap();
        for (fragment, response) in responses.iter() {
            if prompt.contains(fragment.as_str()) {
                if response == "ERROR" {
                    return Err(LlmError::Other("Mock error".to_string()));
                }
                return Ok(response.clone());
            }
        }

        if self.default_response == "ERROR" {
            return Err(LlmError::Other("Mock error".to_string()));
        }
        Ok(self.default_response.clone())
    }
}
