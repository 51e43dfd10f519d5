use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from `.taskflow/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Document file name, relative to the data directory
    #[serde(default = "default_document")]
    pub document: String,
    /// Quiet period before the TUI writes a snapshot
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            document: default_document(),
            save_debounce_ms: default_save_debounce_ms(),
        }
    }
}

fn default_document() -> String {
    "taskflow.json".to_string()
}

fn default_save_debounce_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Hex color overrides keyed by theme slot (e.g. `highlight = "#FB4196"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            colors: HashMap::new(),
        }
    }
}
