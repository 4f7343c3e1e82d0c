//! Configuration for the conversation memory store

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the conversation memory cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Sliding window: how many recent messages form the LLM context
    pub window: usize,

    /// Cache entry time-to-live (seconds)
    pub ttl_secs: u64,
}

impl MemoryConfig {
    /// Get the TTL as a Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window == 0 {
            return Err("window must be greater than 0".to_string());
        }
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

impl Default for MemoryConfig {
    /// 20-message window, 30-minute TTL
    fn default() -> Self {
        Self {
            window: 20,
            ttl_secs: 30 * 60,
        }
    }
}
