use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::io::document_io::{Document, DocumentError, write_document};
use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};

/// First retry delay after a failed write; doubles on each further failure
const RETRY_BASE: Duration = Duration::from_secs(1);
const RETRY_MAX: Duration = Duration::from_secs(60);

/// Coalesces bursts of mutations into a single snapshot write.
///
/// Every mutation calls [`mark_dirty`](Self::mark_dirty), which restarts the
/// quiet window. [`poll`](Self::poll) writes once the window has elapsed with
/// no further mutations. [`flush`](Self::flush) writes immediately.
///
/// A failed write stays pending and is retried with exponential backoff.
/// The snapshot goes to the recovery log once per round of mutations, not
/// once per attempt.
#[derive(Debug)]
pub struct DebouncedWriter {
    data_dir: PathBuf,
    path: PathBuf,
    window: Duration,
    dirty_since: Option<Instant>,
    failures: u32,
    retry_at: Option<Instant>,
    snapshot_logged: bool,
}

impl DebouncedWriter {
    pub fn new(data_dir: PathBuf, path: PathBuf, window: Duration) -> Self {
        DebouncedWriter {
            data_dir,
            path,
            window,
            dirty_since: None,
            failures: 0,
            retry_at: None,
            snapshot_logged: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// Consecutive failed writes since the last successful one
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Record a mutation at `now`
    pub fn mark_dirty(&mut self, now: Instant) {
        self.dirty_since = Some(now);
        self.snapshot_logged = false;
    }

    /// Time left until a pending write is due, if any
    pub fn due_in(&self, now: Instant) -> Option<Duration> {
        self.dirty_since.map(|since| {
            let due = match self.retry_at {
                Some(retry) => retry.max(since + self.window),
                None => since + self.window,
            };
            due.saturating_duration_since(now)
        })
    }

    /// Write the snapshot if the quiet window (and any retry delay) has
    /// elapsed. Returns whether a write happened.
    pub fn poll(&mut self, now: Instant, doc: &Document) -> Result<bool, DocumentError> {
        match self.due_in(now) {
            Some(left) if left.is_zero() => {
                self.write(now, doc)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Write now if there is anything pending, ignoring any retry delay
    pub fn flush(&mut self, doc: &Document) -> Result<(), DocumentError> {
        if self.dirty_since.is_none() {
            return Ok(());
        }
        self.write(Instant::now(), doc)
    }

    fn write(&mut self, now: Instant, doc: &Document) -> Result<(), DocumentError> {
        match write_document(&self.path, doc) {
            Ok(()) => {
                self.dirty_since = None;
                self.failures = 0;
                self.retry_at = None;
                Ok(())
            }
            Err(e) => {
                self.failures += 1;
                let delay = RETRY_BASE
                    .saturating_mul(1u32 << (self.failures - 1).min(16))
                    .min(RETRY_MAX);
                self.retry_at = Some(now + delay);
                tracing::error!(error = %e, failures = self.failures, "snapshot write failed");

                if !self.snapshot_logged {
                    let snapshot = serde_json::to_string_pretty(doc).unwrap_or_default();
                    log_recovery(
                        &self.data_dir,
                        RecoveryEntry::new(RecoveryCategory::Write, "snapshot write failed")
                            .field("Target", self.path.display())
                            .field("Error", &e)
                            .body(snapshot),
                    );
                    self.snapshot_logged = true;
                }
                Err(e)
            }
        }
    }
}
