//! Multi-entry operations with cooperative cancellation
//!
//! A batch checks its [`CancellationToken`] between entries only. An entry that has started
//! being written is always finished, so a cancelled batch leaves every entry either untouched or
//! fully patched.

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
    thread::{self, JoinHandle},
};
use tracing::{info, warn};

use crate::{
    error::{ArchiveError, Result},
    patch::safe_join,
    read::VpkArchive,
};

/// Shared flag used to stop a running batch
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Outcome of a batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Logical paths processed successfully, in order
    pub completed: Vec<String>,
    /// Logical paths that failed, with the reason
    pub failed: Vec<(String, ArchiveError)>,
    /// Whether the batch stopped early because of cancellation
    pub cancelled: bool,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }

    fn record(&mut self, path: &str, result: Result<()>) {
        match result {
            Ok(()) => self.completed.push(path.to_owned()),
            Err(err) => {
                warn!(path, %err, "batch entry failed");
                self.failed.push((path.to_owned(), err));
            }
        }
    }
}

impl VpkArchive {
    /// Extract every listed entry below `destination`, keeping the logical directory layout.
    pub fn extract_batch<I, S>(
        &self,
        paths: I,
        destination: &Path,
        token: &CancellationToken,
    ) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BatchReport::default();
        for path in paths {
            if token.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let path = path.as_ref();
            let result = self.by_name(path).and_then(|entry| {
                let target = safe_join(destination, &entry.path)?;
                self.extract(&entry, target)
            });
            report.record(path, result);
        }

        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            cancelled = report.cancelled,
            "extract batch finished"
        );
        report
    }

    /// Patch every listed entry with its replacement bytes.
    pub fn patch_batch<I, S, B>(
        &self,
        items: I,
        backup: bool,
        token: &CancellationToken,
    ) -> BatchReport
    where
        I: IntoIterator<Item = (S, B)>,
        S: AsRef<str>,
        B: AsRef<[u8]>,
    {
        let mut report = BatchReport::default();
        for (path, payload) in items {
            if token.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let path = path.as_ref();
            let result = self
                .by_name(path)
                .and_then(|entry| self.patch(&entry, payload.as_ref(), backup));
            report.record(path, result);
        }

        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            cancelled = report.cancelled,
            "patch batch finished"
        );
        report
    }
}

/// A batch running on a background thread
#[derive(Debug)]
pub struct BatchHandle {
    token: CancellationToken,
    receiver: mpsc::Receiver<BatchReport>,
    thread: JoinHandle<()>,
}

impl BatchHandle {
    /// Ask the batch to stop after the entry it is working on.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the batch reports back.
    pub fn wait(self) -> Result<BatchReport> {
        let report = self.receiver.recv().map_err(|_| ArchiveError::WorkerFailed);
        if self.thread.join().is_err() {
            return Err(ArchiveError::WorkerFailed);
        }
        report
    }
}

/// Run [`VpkArchive::extract_batch`] on a background thread.
pub fn spawn_extract(
    archive: Arc<VpkArchive>,
    paths: Vec<String>,
    destination: PathBuf,
    token: CancellationToken,
) -> BatchHandle {
    let (sender, receiver) = mpsc::channel();
    let worker_token = token.clone();
    let thread = thread::spawn(move || {
        let report = archive.extract_batch(&paths, &destination, &worker_token);
        // The receiver may already be gone when nobody waits for the result.
        let _ = sender.send(report);
    });

    BatchHandle {
        token,
        receiver,
        thread,
    }
}
