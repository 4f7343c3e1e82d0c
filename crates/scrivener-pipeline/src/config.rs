//! Configuration for the pipeline

use scrivener_conversation::MemoryConfig;
use scrivener_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the document pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Placeholder extraction settings
    pub extractor: ExtractorConfig,

    /// Conversation memory cache settings
    pub memory: MemoryConfig,

    /// Characters of surrounding document text given to question prompts
    pub context_chars: usize,
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.extractor.validate()?;
        self.memory.validate()?;
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            memory: MemoryConfig::default(),
            context_chars: 200,
        }
    }
}
