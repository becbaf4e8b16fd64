use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL of the session backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token attached to every backend request when present.
    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default)]
    pub debug: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            debug: false,
        }
    }
}

impl ChatConfig {
    pub fn has_token(&self) -> bool {
        self.api_token.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// Load config: defaults, overlaid with the global config file if it
/// exists, then environment variables.
pub fn load_config() -> Result<ChatConfig, ConfigError> {
    let mut config = ChatConfig::default();

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("talu").join("config.json");
        if path.exists() {
            merge_config(&mut config, load_config_file(&path)?);
        }
    }

    detect_env(&mut config);

    Ok(config)
}

pub fn load_config_file(path: &Path) -> Result<ChatConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::File(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))
}

fn merge_config(base: &mut ChatConfig, overlay: ChatConfig) {
    if overlay.base_url != default_base_url() {
        base.base_url = overlay.base_url;
    }
    if overlay.api_token.is_some() {
        base.api_token = overlay.api_token;
    }
    if overlay.debug {
        base.debug = true;
    }
}

fn detect_env(config: &mut ChatConfig) {
    if let Ok(url) = std::env::var("TALU_BASE_URL") {
        if !url.is_empty() {
            config.base_url = url;
        }
    }

    // TALU_API_TOKEN wins over the generic fallback
    for var in ["TALU_API_TOKEN", "CHAT_API_TOKEN"] {
        if let Ok(token) = std::env::var(var) {
            if !token.is_empty() {
                config.api_token = Some(token);
                break;
            }
        }
    }
}
