//! Gemini Provider Implementation
//!
//! Provides integration with the Google Generative Language API.
//!
//! # Features
//!
//! - Async HTTP communication with the generateContent endpoint
//! - Configurable endpoint and per-profile models
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use scrivener_llm::GeminiProvider;
//!
//! // Create a Gemini provider
//! let provider = GeminiProvider::new("api-key-here");
//!
//! // Note: The generate method is async, so you need to use it in an async
//! // context or use the LlmProvider trait's sync wrapper
//! ```

use crate::LlmError;
use scrivener_domain::traits::{GenerationProfile, LlmProvider as LlmProviderTrait};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Generative Language API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for the light/creative profile
pub const DEFAULT_LIGHT_MODEL: &str = "gemini-2.5-flash-lite";

/// Default model for the precise/low-temperature profile
pub const DEFAULT_PRECISE_MODEL: &str = "gemini-2.5-pro";

/// Temperature for the light profile (conversational wording)
pub const LIGHT_TEMPERATURE: f64 = 0.7;

/// Temperature for the precise profile (extraction and validation)
pub const PRECISE_TEMPERATURE: f64 = 0.1;

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Gemini API provider
///
/// Maps `GenerationProfile::Light` to a cheap, fast model at moderate
/// temperature and `GenerationProfile::Precise` to a stronger model at
/// near-zero temperature.
pub struct GeminiProvider {
    endpoint: String,
    api_key: String,
    light_model: String,
    precise_model: String,
    client: reqwest::Client,
    max_retries: u32,
}

/// Request body for the generateContent API
#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

/// Response from the generateContent API
#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<Part>,
}

impl GeminiProvider {
    /// Create a new Gemini provider with default endpoint and models
    ///
    /// # Parameters
    ///
    /// - `api_key`: Generative Language API key
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap();

        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            light_model: DEFAULT_LIGHT_MODEL.to_string(),
            precise_model: DEFAULT_PRECISE_MODEL.to_string(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Override the API endpoint (e.g. for a proxy)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the models used for the two profiles
    pub fn with_models(
        mut self,
        light_model: impl Into<String>,
        precise_model: impl Into<String>,
    ) -> Self {
        self.light_model = light_model.into();
        self.precise_model = precise_model.into();
        self
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Model and temperature for a profile
    fn profile_config(&self, profile: GenerationProfile) -> (&str, f64) {
        match profile {
            GenerationProfile::Light => (&self.light_model, LIGHT_TEMPERATURE),
            GenerationProfile::Precise => (&self.precise_model, PRECISE_TEMPERATURE),
        }
    }

    /// Generate text using the Gemini API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The API is unreachable
    /// - The model is not available
    /// - The rate limit is exceeded
    /// - The response format is invalid
    pub async fn generate(
        &self,
        prompt: &str,
        profile: GenerationProfile,
    ) -> Result<String, LlmError> {
        let (model, temperature) = self.profile_config(profile);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, model, self.api_key
        );

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature },
        };

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        match response.json::<GenerateContentResponse>().await {
                            Ok(body) => {
                                return Self::first_candidate_text(body);
                            }
                            Err(e) => {
                                return Err(LlmError::InvalidResponse(format!(
                                    "Failed to parse response: {}",
                                    e
                                )));
                            }
                        }
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(model.to_string()));
                    } else if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    /// Pull the first candidate's text out of a response body
    fn first_candidate_text(body: GenerateContentResponse) -> Result<String, LlmError> {
        let candidates = body
            .candidates
            .ok_or_else(|| LlmError::InvalidResponse("Response has no candidates".to_string()))?;

        let text = candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| LlmError::InvalidResponse("Candidate has no text part".to_string()))?;

        Ok(text)
    }
}

impl LlmProviderTrait for GeminiProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str, profile: GenerationProfile) -> Result<String, Self::Error> {
        // Blocking wrapper for the async method
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(async { self.generate(prompt, profile).await })
    }
}
