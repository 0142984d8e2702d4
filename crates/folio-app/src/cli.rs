//! CLI argument definitions for the folio terminal client.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Folio: chat with a portfolio assistant from the terminal.
#[derive(Parser, Debug)]
#[command(name = "folio", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the reasoning service.
    #[arg(short = 'u', long = "api-url")]
    pub api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > FOLIO_CONFIG env var > ~/.folio/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("FOLIO_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the reasoning service base URL.
    ///
    /// Priority: --api-url flag > FOLIO_API_URL env var. Returns `None` when
    /// neither is set, leaving the config file value in place.
    pub fn resolve_api_url(&self) -> Option<String> {
        if let Some(ref url) = self.api_url {
            return Some(url.clone());
        }
        std::env::var("FOLIO_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".folio").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".folio").join("config.toml");
    }
    PathBuf::from("config.toml")
}
