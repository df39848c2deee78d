// LogDeck - app/load.rs
//
// Collaborator calls (file listing, record loading) run on background
// threads and report back over an mpsc channel.
//
// Architecture:
//   - `LoadManager` lives on the owner's thread; each request runs on its own
//     short-lived worker thread.
//   - Listing and record loading are independent lanes. Starting a request
//     on a lane sets the cancel flag of the previous request on that lane.
//   - Workers check their `Arc<AtomicBool>` flag before sending, and the
//     owner drops any message whose request id is not the lane's latest, so
//     a slow response for file A can never overwrite file B.
//   - Cancellation is cooperative: a superseded worker finishes its call and
//     then discards the result.

use crate::core::model::{FileDescriptor, LoadProgress, RecordSet};
use crate::util::error::BackendError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

// =============================================================================
// Collaborator interface
// =============================================================================

/// The external data source: lists a source's files and reads a file's
/// already-parsed records.
pub trait LogBackend: Send + Sync {
    /// List every log file exposed by `source_id`.
    fn list_files(&self, source_id: &str) -> Result<Vec<FileDescriptor>, BackendError>;

    /// Read the parsed records of one file.
    fn read_records(
        &self,
        source_id: &str,
        path: &str,
        file_type: &str,
    ) -> Result<RecordSet, BackendError>;
}

// =============================================================================
// LoadManager
// =============================================================================

/// A request that has been started and not yet answered.
#[derive(Debug)]
struct InFlight {
    id: u64,
    cancel: Arc<AtomicBool>,
}

impl InFlight {
    fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

/// Which lane a request id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lane {
    Listing,
    Records,
}

/// Runs collaborator calls off the owner's thread with supersede semantics.
pub struct LoadManager {
    backend: Arc<dyn LogBackend>,
    progress_tx: mpsc::Sender<LoadProgress>,
    progress_rx: mpsc::Receiver<LoadProgress>,
    listing: Option<InFlight>,
    records: Option<InFlight>,
    next_id: u64,
}

impl LoadManager {
    pub fn new(backend: Arc<dyn LogBackend>) -> Self {
        let (progress_tx, progress_rx) = mpsc::channel();
        Self {
            backend,
            progress_tx,
            progress_rx,
            listing: None,
            records: None,
            next_id: 1,
        }
    }

    fn begin(&mut self, lane: Lane) -> (u64, Arc<AtomicBool>) {
        let id = self.next_id;
        self.next_id += 1;
        let cancel = Arc::new(AtomicBool::new(false));

        let slot = match lane {
            Lane::Listing => &mut self.listing,
            Lane::Records => &mut self.records,
        };
        if let Some(previous) = slot.take() {
            tracing::debug!(superseded = previous.id, by = id, lane = ?lane, "Request superseded");
            previous.cancel();
        }
        *slot = Some(InFlight {
            id,
            cancel: Arc::clone(&cancel),
        });
        (id, cancel)
    }

    /// Start listing the files of `source_id`. Returns the request id.
    pub fn request_files(&mut self, source_id: &str) -> u64 {
        let (request_id, cancel) = self.begin(Lane::Listing);
        let backend = Arc::clone(&self.backend);
        let tx = self.progress_tx.clone();
        let source_id = source_id.to_string();

        std::thread::spawn(move || {
            let msg = match backend.list_files(&source_id) {
                Ok(files) => LoadProgress::FilesListed {
                    request_id,
                    source_id,
                    files,
                },
                Err(error) => LoadProgress::Failed { request_id, error },
            };
            deliver(&tx, &cancel, msg);
        });

        tracing::info!(request_id, "File listing started");
        request_id
    }

    /// Start loading the records of `file`.
    ///
    /// Zero-size and unreadable files are never dispatched.
    pub fn request_records(
        &mut self,
        source_id: &str,
        file: &FileDescriptor,
    ) -> Result<u64, BackendError> {
        if !file.is_selectable() {
            let reason = if file.readable {
                "file is empty"
            } else {
                "file is not readable"
            };
            return Err(BackendError::NotSelectable {
                path: file.path.clone().into(),
                reason,
            });
        }

        let (request_id, cancel) = self.begin(Lane::Records);
        let backend = Arc::clone(&self.backend);
        let tx = self.progress_tx.clone();
        let source_id = source_id.to_string();
        let path = file.path.clone();
        let file_type = file.file_type.clone();

        std::thread::spawn(move || {
            let msg = match backend.read_records(&source_id, &path, &file_type) {
                Ok(records) => LoadProgress::RecordsLoaded {
                    request_id,
                    path,
                    records,
                },
                Err(error) => LoadProgress::Failed { request_id, error },
            };
            deliver(&tx, &cancel, msg);
        });

        tracing::info!(request_id, path = %file.path, "Record load started");
        Ok(request_id)
    }

    /// Cancel every outstanding request.
    pub fn cancel_all(&mut self) {
        for in_flight in [self.listing.take(), self.records.take()].into_iter().flatten() {
            in_flight.cancel();
        }
    }

    /// True while any request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.listing.is_some() || self.records.is_some()
    }

    /// Retire the lane that `request_id` answers. Returns false for
    /// stragglers from superseded requests.
    fn accept(&mut self, request_id: u64) -> bool {
        for slot in [&mut self.listing, &mut self.records] {
            if slot.as_ref().is_some_and(|f| f.id == request_id) {
                *slot = None;
                return true;
            }
        }
        tracing::debug!(request_id, "Dropping stale response");
        false
    }

    /// Poll for completed requests without blocking. Only answers to the
    /// latest request of each lane are returned.
    pub fn poll(&mut self) -> Vec<LoadProgress> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.progress_rx.try_recv() {
            if self.accept(msg.request_id()) {
                messages.push(msg);
            }
        }
        messages
    }

    /// Block until the next current answer arrives or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadProgress> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.progress_rx.recv_timeout(remaining) {
                Ok(msg) if self.accept(msg.request_id()) => return Some(msg),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }
}

/// Send `msg` unless the request was superseded in the meantime.
fn deliver(tx: &mpsc::Sender<LoadProgress>, cancel: &AtomicBool, msg: LoadProgress) {
    if cancel.load(Ordering::SeqCst) {
        tracing::trace!(request_id = msg.request_id(), "Superseded; result discarded");
        return;
    }
    // Receiver dropped means the owner is gone; nothing to do.
    let _ = tx.send(msg);
}
