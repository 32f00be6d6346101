//! Configuration management for querydesk.
//!
//! Handles loading configuration from TOML files and environment variables.

use crate::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "QUERYDESK_API_URL";

/// Main configuration structure for querydesk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Query service settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Editor behaviour.
    #[serde(default)]
    pub editor: EditorConfig,
}

/// Query service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the service API, e.g. `http://localhost:5000/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout. Unset means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Checks that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConsoleError::config(format!("Invalid API URL '{}': {e}", self.base_url)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConsoleError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        Ok(())
    }

    /// Returns a display-safe string for the header bar.
    pub fn display_string(&self) -> String {
        match Url::parse(&self.base_url) {
            Ok(url) => {
                let host = url.host_str().unwrap_or("localhost");
                match url.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                }
            }
            Err(_) => self.base_url.clone(),
        }
    }
}

/// Editor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditorConfig {
    /// Quiet interval before an autocomplete request is sent.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl EditorConfig {
    /// Returns the debounce interval as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("querydesk")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConsoleError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ConsoleError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies overrides with precedence CLI > environment > file.
    pub fn apply_overrides(
        &mut self,
        cli_api_url: Option<&str>,
        env_api_url: Option<String>,
        cli_debounce_ms: Option<u64>,
    ) {
        if let Some(url) = cli_api_url {
            self.api.base_url = url.to_string();
        } else if let Some(url) = env_api_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }

        if let Some(ms) = cli_debounce_ms {
            self.editor.debounce_ms = ms;
        }
    }
}
