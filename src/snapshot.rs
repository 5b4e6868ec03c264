//! Snapshot builder: content fingerprints for one directory level.
//!
//! A snapshot maps the BLAKE3 digest of each regular file to its name,
//! scoped to a single directory level. Subdirectories are excluded here;
//! they are reconciled by a separate pass. Snapshots are ephemeral and
//! rebuilt from scratch on every reconciliation pass.

use crate::error::SyncError;
use crate::types::Fingerprint;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const HASH_BUF_SIZE: usize = 64 * 1024;

/// One-level mapping from content fingerprint to file name.
///
/// Two files with identical content collapse to a single entry; entries are
/// inserted in lexicographic name order with first-insert-wins, so the
/// lexicographically smallest name survives the collapse.
pub type DirectorySnapshot = BTreeMap<Fingerprint, String>;

/// Immediate entries of one directory, split by kind and sorted by name
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    /// Regular file names (symlinks resolving to files included, as opaque files)
    pub files: Vec<String>,
    /// Immediate subdirectory names
    pub dirs: BTreeSet<String>,
}

/// List the immediate entries of `dir`, classifying each as file or directory.
///
/// Entry kind is taken from `fs::metadata`, which follows symlinks: a link to
/// a file is treated as an opaque file, a link to a directory as a directory.
pub fn list_directory(dir: &Path) -> Result<DirectoryListing, SyncError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SyncError::from_io(dir, e))?;

    let mut listing = DirectoryListing::default();
    for entry in entries {
        let entry = entry.map_err(|e| SyncError::from_io(dir, e))?;
        let path = entry.path();
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            // Dangling link, or the entry vanished between listing and stat.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(SyncError::from_io(&path, e)),
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if metadata.is_dir() {
            listing.dirs.insert(name);
        } else if metadata.is_file() {
            listing.files.push(name);
        }
        // Other kinds (sockets, fifos) are not mirrored.
    }
    listing.files.sort();
    Ok(listing)
}

/// Build the fingerprint snapshot for one directory level.
///
/// Fails with `PathNotFound` if `dir` does not exist, `AccessDenied` on
/// permission failure, and `Io` if hashing any individual file fails. The
/// whole snapshot aborts on error; no partial snapshot is returned.
pub fn build_snapshot(dir: &Path) -> Result<DirectorySnapshot, SyncError> {
    let listing = list_directory(dir)?;
    snapshot_from_listing(dir, &listing)
}

/// Hash the files of an already-obtained listing into a snapshot
pub(crate) fn snapshot_from_listing(
    dir: &Path,
    listing: &DirectoryListing,
) -> Result<DirectorySnapshot, SyncError> {
    let mut snapshot = DirectorySnapshot::new();
    for name in &listing.files {
        let digest = hash_file(&dir.join(name))?;
        snapshot.entry(digest).or_insert_with(|| name.clone());
    }
    Ok(snapshot)
}

/// Stream a file's full content through BLAKE3
pub fn hash_file(path: &Path) -> Result<Fingerprint, SyncError> {
    let mut file = File::open(path).map_err(|e| SyncError::from_io(path, e))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; HASH_BUF_SIZE];
    loop {
        let read = file.read(&mut buf).map_err(|e| SyncError::from_io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(*hasher.finalize().as_bytes())
}
