//! Replica: One-Way Directory Mirroring
//!
//! Periodic, content-addressed mirroring of a source directory tree into a
//! replica tree. Each pass snapshots one directory level at a time, diffs
//! fingerprint mappings, applies the converging mutations, and recurses.

pub mod config;
pub mod daemon;
pub mod error;
pub mod events;
pub mod logging;
pub mod plan;
pub mod reconcile;
pub mod snapshot;
pub mod status;
pub mod tooling;
pub mod types;
