//! Reconciler: converges a replica directory tree to its source.
//!
//! One reconciliation pass walks the tree top-down. Each directory level is
//! fully resolved (file mutations, then subdirectory set mutations) before
//! recursing, so a newly created replica subdirectory is guaranteed to exist
//! before its own reconciliation enumerates it. The source tree is read-only
//! input; the replica tree is exclusively mutated here.

use crate::error::SyncError;
use crate::events::{SyncEventSink, TracingSink};
use crate::plan::{self, SyncAction};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Applies mutation plans level by level, reporting each mutation to the
/// injected event sink.
pub struct Reconciler {
    sink: Box<dyn SyncEventSink>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    /// Reconciler reporting through the default tracing sink
    pub fn new() -> Self {
        Self::with_sink(Box::new(TracingSink))
    }

    /// Reconciler reporting through a caller-provided sink
    pub fn with_sink(sink: Box<dyn SyncEventSink>) -> Self {
        Self { sink }
    }

    /// Run one full reconciliation pass.
    ///
    /// The sole recursive entry point. Fails with `PathNotFound` if the
    /// source directory is missing; creates the replica root if absent.
    /// An error at any level aborts that level and its descendants for this
    /// pass; mutations already applied at shallower levels are not rolled
    /// back. The next scheduled pass retries from the top.
    pub fn reconcile(&self, source_dir: &Path, replica_dir: &Path) -> Result<(), SyncError> {
        if !source_dir.is_dir() {
            return Err(SyncError::PathNotFound(source_dir.to_path_buf()));
        }

        let started = Instant::now();
        info!(
            source = %source_dir.display(),
            replica = %replica_dir.display(),
            "Starting reconciliation pass"
        );

        if !replica_dir.exists() {
            fs::create_dir(replica_dir).map_err(|e| SyncError::from_io(replica_dir, e))?;
            self.sink.replica_root_created(replica_dir);
        }

        self.sync_level(source_dir, replica_dir)?;

        info!(
            source = %source_dir.display(),
            replica = %replica_dir.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Reconciliation pass complete"
        );
        Ok(())
    }

    /// Synchronize the file set of a single directory level.
    ///
    /// Creates the replica directory first if missing (idempotent). Applies
    /// only file mutations; subdirectories are left untouched.
    pub fn sync_files(&self, source_dir: &Path, replica_dir: &Path) -> Result<(), SyncError> {
        if !replica_dir.exists() {
            fs::create_dir(replica_dir).map_err(|e| SyncError::from_io(replica_dir, e))?;
            self.sink.replica_root_created(replica_dir);
        }

        let level = plan::plan_level(source_dir, replica_dir)?;
        for action in &level.plan.actions {
            match action {
                SyncAction::CopyFile { .. } | SyncAction::DeleteFile { .. } => {
                    self.apply(action)?
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Resolve one level completely, then recurse into every source
    /// subdirectory pair.
    fn sync_level(&self, source_dir: &Path, replica_dir: &Path) -> Result<(), SyncError> {
        let level = plan::plan_level(source_dir, replica_dir)?;
        if !level.plan.is_empty() {
            debug!(
                dir = %source_dir.display(),
                actions = level.plan.len(),
                "Applying level plan"
            );
        }
        for action in &level.plan.actions {
            self.apply(action)?;
        }
        for name in &level.source_dirs {
            self.sync_level(&source_dir.join(name), &replica_dir.join(name))?;
        }
        Ok(())
    }

    fn apply(&self, action: &SyncAction) -> Result<(), SyncError> {
        match action {
            SyncAction::CopyFile { source, dest } => {
                fs::copy(source, dest).map_err(|e| SyncError::from_io(source, e))?;
                self.sink.file_copied(source, dest);
            }
            SyncAction::DeleteFile { path } => {
                fs::remove_file(path).map_err(|e| SyncError::from_io(path, e))?;
                self.sink.file_deleted(path);
            }
            SyncAction::CreateDir { path } => {
                fs::create_dir(path).map_err(|e| SyncError::from_io(path, e))?;
                self.sink.dir_created(path);
            }
            SyncAction::RemoveDirTree { path } => {
                fs::remove_dir_all(path).map_err(|e| SyncError::from_io(path, e))?;
                self.sink.dir_tree_deleted(path);
            }
        }
        Ok(())
    }
}
