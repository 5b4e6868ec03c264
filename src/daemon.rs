//! Periodic mirroring daemon.
//!
//! Drives the reconciler on a fixed wall-clock interval. A trigger that
//! fires while a pass is still in flight is skipped, never queued; missed
//! ticks are collapsed by computing the next deadline from pass completion.
//! A failed pass is logged and the next tick retries from the tree root.

use crate::error::SyncError;
use crate::reconcile::Reconciler;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Granularity of the stop-flag poll while waiting out an interval
const TICK_STEP: Duration = Duration::from_millis(50);

/// Outcome of a single trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A pass ran to completion
    Completed,
    /// A pass ran and failed; the error was logged
    Failed,
    /// A pass was already in flight, trigger dropped
    Skipped,
}

/// Fixed-interval sync daemon
pub struct SyncDaemon {
    reconciler: Reconciler,
    source: PathBuf,
    replica: PathBuf,
    interval: Duration,
    running: Arc<RwLock<bool>>,
    busy: AtomicBool,
}

impl SyncDaemon {
    pub fn new(
        reconciler: Reconciler,
        source: PathBuf,
        replica: PathBuf,
        interval: Duration,
    ) -> Self {
        Self {
            reconciler,
            source,
            replica,
            interval,
            running: Arc::new(RwLock::new(false)),
            busy: AtomicBool::new(false),
        }
    }

    /// Run the tick loop until `stop` is called.
    ///
    /// The first pass runs immediately; each subsequent pass starts one
    /// interval after the previous tick began, or immediately after a pass
    /// that overran its interval.
    pub fn start(&self) {
        *self.running.write() = true;
        info!(
            source = %self.source.display(),
            replica = %self.replica.display(),
            interval_secs = self.interval.as_secs(),
            "Sync daemon started"
        );

        while *self.running.read() {
            let tick_started = Instant::now();
            self.trigger();

            let deadline = tick_started + self.interval;
            loop {
                if !*self.running.read() {
                    info!("Sync daemon stopped");
                    return;
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                thread::sleep(TICK_STEP.min(deadline - now));
            }
        }
        info!("Sync daemon stopped");
    }

    /// Run one pass now unless a pass is already in flight.
    pub fn trigger(&self) -> TriggerOutcome {
        if self.busy.swap(true, Ordering::SeqCst) {
            debug!("Pass already in flight, skipping trigger");
            return TriggerOutcome::Skipped;
        }
        let result = self.reconciler.reconcile(&self.source, &self.replica);
        self.busy.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => TriggerOutcome::Completed,
            Err(e) => {
                // Pass-level failures never terminate the loop; the next
                // tick rescans from the top of the tree.
                self.log_pass_failure(&e);
                TriggerOutcome::Failed
            }
        }
    }

    /// Request loop termination; the loop exits within one poll step
    pub fn stop(&self) {
        *self.running.write() = false;
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }

    fn log_pass_failure(&self, e: &SyncError) {
        error!(
            source = %self.source.display(),
            replica = %self.replica.display(),
            error = %e,
            "Reconciliation pass failed"
        );
    }
}
