use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, atomic_write, log_recovery};
use crate::model::list::{ListKind, TaskList};

/// Error type for document reads and writes
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Everything that is persisted: the todo list and the material library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub todo: TaskList,
    #[serde(default)]
    pub library: TaskList,
}

impl Document {
    pub fn list(&self, kind: ListKind) -> &TaskList {
        match kind {
            ListKind::Todo => &self.todo,
            ListKind::Library => &self.library,
        }
    }

    pub fn list_mut(&mut self, kind: ListKind) -> &mut TaskList {
        match kind {
            ListKind::Todo => &mut self.todo,
            ListKind::Library => &mut self.library,
        }
    }

    /// Borrow both lists mutably, `from` first
    pub fn pair_mut(&mut self, from: ListKind) -> (&mut TaskList, &mut TaskList) {
        match from {
            ListKind::Todo => (&mut self.todo, &mut self.library),
            ListKind::Library => (&mut self.library, &mut self.todo),
        }
    }
}

/// Read the document at `path`.
///
/// A missing file yields the default document. An unparsable file also
/// yields the default document; its raw text is kept in the recovery log
/// under `data_dir` and its bytes are copied next to it with a `.corrupt`
/// suffix. Any other I/O failure is an error, so callers never overwrite a
/// document they could not read.
pub fn read_document(data_dir: &Path, path: &Path) -> Result<Document, DocumentError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::default()),
        Err(source) => {
            tracing::error!(path = %path.display(), error = %source, "could not read document");
            return Err(DocumentError::ReadError {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::default());
    }

    match serde_json::from_slice(&bytes) {
        Ok(doc) => Ok(doc),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "malformed document, starting empty"
            );
            let mut entry =
                RecoveryEntry::new(RecoveryCategory::Parse, "unreadable document replaced")
                    .field("Source", path.display())
                    .field("Error", &e);
            let backup = corrupt_path(path);
            match atomic_write(&backup, &bytes) {
                Ok(()) => entry = entry.field("Backup", backup.display()),
                Err(e) => {
                    tracing::error!(
                        path = %backup.display(),
                        error = %e,
                        "could not back up document"
                    );
                }
            }
            log_recovery(data_dir, entry.body(String::from_utf8_lossy(&bytes)));
            Ok(Document::default())
        }
    }
}

/// Where the raw bytes of an unparsable document are kept
pub fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".corrupt");
    path.with_file_name(name)
}

/// Serialize the document and write it atomically
pub fn write_document(path: &Path, doc: &Document) -> Result<(), DocumentError> {
    let mut json = serde_json::to_string_pretty(doc)?;
    json.push('\n');
    atomic_write(path, json.as_bytes()).map_err(|source| DocumentError::WriteError {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "document written");
    Ok(())
}

/// Replace the document with the default one, keeping the old contents in
/// the recovery log.
pub fn reset_document(
    data_dir: &Path,
    path: &Path,
    doc: &mut Document,
) -> Result<(), DocumentError> {
    let old = serde_json::to_string_pretty(doc)?;
    log_recovery(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Reset, "document reset")
            .field("Source", path.display())
            .body(old),
    );
    *doc = Document::default();
    write_document(path, doc)
}
