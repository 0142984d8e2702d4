use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FolioError, Result};

/// Top-level configuration for the folio assistant.
///
/// Loaded from `~/.folio/config.toml` by default. Every section falls back
/// to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub portfolio: PortfolioConfig,
}

impl FolioConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FolioConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FolioError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Where and how to reach the reasoning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Base URL of the reasoning service.
    pub base_url: String,
    /// Path of the chat endpoint, appended to `base_url`.
    pub chat_path: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            chat_path: "/api/chat".to_string(),
            timeout_secs: 30,
        }
    }
}

impl TransportConfig {
    /// Full URL of the chat endpoint.
    pub fn chat_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.chat_path.trim_start_matches('/')
        )
    }
}

/// Dialogue session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Assistant turn every fresh session starts with.
    pub greeting: String,
    /// Assistant turn appended when the reasoning service cannot be reached.
    pub error_message: String,
    /// Maximum free-text length in characters.
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting:
                "Hi! I can help you learn about my background. What would you like to know?"
                    .to_string(),
            error_message: "Sorry, I encountered an error. Please try again.".to_string(),
            max_message_length: 2000,
        }
    }
}

/// Portfolio data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// JSON file with portfolio records. The built-in sample is used when unset.
    pub path: Option<String>,
}
