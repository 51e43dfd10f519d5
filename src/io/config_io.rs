use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Name of the data directory created by `tf init`
pub const DATA_DIR_NAME: &str = ".taskflow";

const CONFIG_FILE: &str = "config.toml";

const CONFIG_TEMPLATE: &str = r##"[storage]
# Document file, relative to this directory
document = "taskflow.json"
# Quiet period (ms) before the terminal UI saves
save_debounce_ms = 1000

[ui]
# show_key_hints = false
#
# [ui.colors]
# background = "#0C001B"
# text = "#A09BFE"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#5A5580"
# red = "#FF4444"
# yellow = "#FFD700"
# green = "#44FF88"
# cyan = "#44DDFF"
"##;

/// Error type for locating and reading the data directory
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("not a taskflow directory: no .taskflow/ found (run `tf init`)")]
    NotADataDir,
    #[error("taskflow data already exists in {0}")]
    AlreadyInitialized(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A located data directory with its loaded configuration
#[derive(Debug, Clone)]
pub struct Workspace {
    /// The `.taskflow/` directory
    pub data_dir: PathBuf,
    pub config: AppConfig,
}

impl Workspace {
    /// Absolute path of the persisted document
    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(&self.config.storage.document)
    }
}

/// Walk up from `start` looking for `.taskflow/config.toml`.
/// Returns the `.taskflow/` directory.
pub fn discover_data_dir(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut current = start.to_path_buf();
    loop {
        let data_dir = current.join(DATA_DIR_NAME);
        if data_dir.is_dir() && data_dir.join(CONFIG_FILE).exists() {
            return Ok(data_dir);
        }
        if !current.pop() {
            return Err(ConfigError::NotADataDir);
        }
    }
}

/// Read `config.toml` from a data directory
pub fn load_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Locate and load the workspace, starting from `start`
pub fn open_workspace(start: &Path) -> Result<Workspace, ConfigError> {
    let data_dir = discover_data_dir(start)?;
    let config = load_config(&data_dir)?;
    tracing::debug!(data_dir = %data_dir.display(), "workspace opened");
    Ok(Workspace { data_dir, config })
}

/// Create `.taskflow/config.toml` under `root`. The document itself is
/// written lazily on first save.
pub fn init_data_dir(root: &Path) -> Result<PathBuf, ConfigError> {
    let data_dir = root.join(DATA_DIR_NAME);
    if data_dir.join(CONFIG_FILE).exists() {
        return Err(ConfigError::AlreadyInitialized(data_dir));
    }
    fs::create_dir_all(&data_dir)?;
    fs::write(data_dir.join(CONFIG_FILE), CONFIG_TEMPLATE)?;
    Ok(data_dir)
}
