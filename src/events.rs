//! Structured event sink for replica mutations.
//!
//! The reconciler reports every mutation it applies through an injected sink
//! rather than a process-global logger. The default sink forwards to
//! `tracing`; a capturing sink records events for assertions in tests and
//! embedders that want programmatic access to the mutation stream.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::info;

/// Receiver for reconciliation events.
///
/// Implementations must not assume any formatting responsibility; routing
/// and rendering belong to the logging layer.
pub trait SyncEventSink: Send + Sync {
    /// The replica root directory was created because it was missing
    fn replica_root_created(&self, path: &Path);
    /// A source file was copied over (or into) the replica
    fn file_copied(&self, source: &Path, dest: &Path);
    /// A replica file was deleted
    fn file_deleted(&self, path: &Path);
    /// A replica subdirectory was created
    fn dir_created(&self, path: &Path);
    /// A replica subdirectory and its entire contents were deleted
    fn dir_tree_deleted(&self, path: &Path);
}

/// Default sink emitting `tracing` events with structured fields
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl SyncEventSink for TracingSink {
    fn replica_root_created(&self, path: &Path) {
        info!(path = %path.display(), "Replica root created");
    }

    fn file_copied(&self, source: &Path, dest: &Path) {
        info!(source = %source.display(), dest = %dest.display(), "File copied");
    }

    fn file_deleted(&self, path: &Path) {
        info!(path = %path.display(), "File deleted");
    }

    fn dir_created(&self, path: &Path) {
        info!(path = %path.display(), "Directory created");
    }

    fn dir_tree_deleted(&self, path: &Path) {
        info!(path = %path.display(), "Directory tree deleted");
    }
}

/// One recorded reconciliation event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    ReplicaRootCreated(PathBuf),
    FileCopied { source: PathBuf, dest: PathBuf },
    FileDeleted(PathBuf),
    DirCreated(PathBuf),
    DirTreeDeleted(PathBuf),
}

/// Sink that records every event, for tests and programmatic consumers
#[derive(Debug, Default)]
pub struct CapturingSink {
    events: Mutex<Vec<SyncEvent>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events recorded so far, in emission order
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl SyncEventSink for CapturingSink {
    fn replica_root_created(&self, path: &Path) {
        self.events
            .lock()
            .push(SyncEvent::ReplicaRootCreated(path.to_path_buf()));
    }

    fn file_copied(&self, source: &Path, dest: &Path) {
        self.events.lock().push(SyncEvent::FileCopied {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
        });
    }

    fn file_deleted(&self, path: &Path) {
        self.events
            .lock()
            .push(SyncEvent::FileDeleted(path.to_path_buf()));
    }

    fn dir_created(&self, path: &Path) {
        self.events
            .lock()
            .push(SyncEvent::DirCreated(path.to_path_buf()));
    }

    fn dir_tree_deleted(&self, path: &Path) {
        self.events
            .lock()
            .push(SyncEvent::DirTreeDeleted(path.to_path_buf()));
    }
}
