//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for talkpanda
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Application backend settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// AI service settings
    #[serde(default)]
    pub ai: AiServiceConfig,
    /// Speech synthesis/recognition settings
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Application backend (conversation storage, history) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the application backend
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// Bearer token sent with every request (empty = unauthenticated)
    #[serde(default)]
    pub auth_token: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
    /// Page size used when fetching conversation history
    #[serde(default = "default_history_page_size")]
    pub history_page_size: u32,
}

fn default_backend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_backend_timeout() -> u64 {
    15
}

fn default_history_page_size() -> u32 {
    20
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            auth_token: String::new(),
            timeout_secs: default_backend_timeout(),
            history_page_size: default_history_page_size(),
        }
    }
}

/// AI inference service (chat, feedback, suggestions) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiServiceConfig {
    /// Base URL of the AI service
    #[serde(default = "default_ai_url")]
    pub base_url: String,
    /// Bearer token sent with every request (empty = unauthenticated)
    #[serde(default)]
    pub auth_token: String,
    /// Per-request timeout in seconds. Inference calls are slower than
    /// plain CRUD, so this default is higher than the backend's.
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
}

fn default_ai_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_ai_timeout() -> u64 {
    30
}

impl Default for AiServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_ai_url(),
            auth_token: String::new(),
            timeout_secs: default_ai_timeout(),
        }
    }
}

/// Text-to-speech voice settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Voice accent (us, uk, au)
    #[serde(default = "default_accent")]
    pub accent: String,
    /// Voice gender (male, female)
    #[serde(default = "default_gender")]
    pub gender: String,
}

fn default_accent() -> String {
    "us".to_string()
}

fn default_gender() -> String {
    "female".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            accent: default_accent(),
            gender: default_gender(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:3000");
        assert_eq!(config.ai.base_url, "http://localhost:8000");
        assert_eq!(config.backend.history_page_size, 20);
        assert_eq!(config.speech.accent, "us");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"ai": {"base_url": "https://ai.example.com"}}"#).unwrap();
        assert_eq!(config.ai.base_url, "https://ai.example.com");
        assert_eq!(config.ai.timeout_secs, 30);
        assert_eq!(config.backend.base_url, "http://localhost:3000");
    }
}
