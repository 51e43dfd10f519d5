use std::path::PathBuf;

use crate::io::config_io::{self, ConfigError, DATA_DIR_NAME};
use crate::io::document_io::{self, Document};

/// Create `.taskflow/` in the current directory (or the -C directory) with a
/// commented config and an empty document.
pub fn cmd_init(data_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match data_dir {
        Some(dir) => {
            let path = PathBuf::from(dir);
            std::fs::create_dir_all(&path)?;
            path
        }
        None => std::env::current_dir()?,
    };

    // Nested data directories are allowed, but say which one wins
    if let Some(parent) = root.parent()
        && let Ok(outer) = config_io::discover_data_dir(parent)
    {
        eprintln!("note: outer taskflow data found at {}", outer.display());
        eprintln!("creating new data in ./{}/", DATA_DIR_NAME);
    }

    let created = match config_io::init_data_dir(&root) {
        Ok(dir) => dir,
        Err(ConfigError::AlreadyInitialized(dir)) => {
            return Err(format!("taskflow data already exists in {}", dir.display()).into());
        }
        Err(e) => return Err(e.into()),
    };

    let workspace = config_io::open_workspace(&root)?;
    document_io::write_document(&workspace.document_path(), &Document::default())?;

    println!("Initialized taskflow data in {}", created.display());
    Ok(())
}
