//! Mutation planning: the diff between a source level and a replica level.
//!
//! The planner computes the exact set of filesystem mutations that converge
//! one replica directory level to its source counterpart, without applying
//! anything. The reconciler applies level plans as it descends; `plan_tree`
//! aggregates a whole-tree plan for dry-run reporting.

use crate::error::SyncError;
use crate::snapshot::{self, DirectoryListing};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A single replica mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Copy a source file over `dest`, overwriting any existing file
    CopyFile { source: PathBuf, dest: PathBuf },
    /// Delete a replica file
    DeleteFile { path: PathBuf },
    /// Create a replica subdirectory (contents populated by recursion)
    CreateDir { path: PathBuf },
    /// Delete a replica subdirectory and its entire contents
    RemoveDirTree { path: PathBuf },
}

/// Ordered mutation set for one level or one whole tree
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub actions: Vec<SyncAction>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn copies(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::CopyFile { .. }))
    }

    pub fn file_deletes(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::DeleteFile { .. }))
    }

    pub fn dir_creates(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::CreateDir { .. }))
    }

    pub fn dir_removes(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::RemoveDirTree { .. }))
    }

    fn count(&self, pred: impl Fn(&SyncAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }
}

/// Plan for one directory level plus the recursion set
#[derive(Debug, Clone)]
pub struct LevelPlan {
    pub plan: SyncPlan,
    /// Every immediate source subdirectory name; recursion descends into each
    pub source_dirs: BTreeSet<String>,
}

/// Compute the mutation set for a single directory level.
///
/// A missing replica directory is treated as empty, so the plan contains a
/// copy for every source file and a create for every source subdirectory.
/// Action order within the level: content deletions, stale-name deletions,
/// subdirectory removals, copies, subdirectory creations. Removals precede
/// copies so a replica directory shadowed by a same-named source file is
/// cleared before the copy lands.
pub fn plan_level(source_dir: &Path, replica_dir: &Path) -> Result<LevelPlan, SyncError> {
    let source_listing = snapshot::list_directory(source_dir)?;
    let replica_listing = match snapshot::list_directory(replica_dir) {
        Ok(listing) => listing,
        Err(SyncError::PathNotFound(_)) => DirectoryListing::default(),
        Err(e) => return Err(e),
    };

    let source_snapshot = snapshot::snapshot_from_listing(source_dir, &source_listing)?;
    let replica_snapshot = snapshot::snapshot_from_listing(replica_dir, &replica_listing)?;

    let source_names: BTreeSet<&String> = source_listing.files.iter().collect();
    let mut plan = SyncPlan::default();
    let mut deleted: BTreeSet<&String> = BTreeSet::new();

    // Deletion pass: content that no longer exists anywhere in source,
    // regardless of what it is named.
    for (fingerprint, name) in &replica_snapshot {
        if !source_snapshot.contains_key(fingerprint) {
            plan.actions.push(SyncAction::DeleteFile {
                path: replica_dir.join(name),
            });
            deleted.insert(name);
        }
    }

    // Stale-name pass: names absent from source. Walks the full file list,
    // not the collapsed snapshot, so duplicate-content leftovers are caught.
    for name in &replica_listing.files {
        if !source_names.contains(name) && !deleted.contains(name) {
            plan.actions.push(SyncAction::DeleteFile {
                path: replica_dir.join(name),
            });
        }
    }

    for name in replica_listing.dirs.difference(&source_listing.dirs) {
        plan.actions.push(SyncAction::RemoveDirTree {
            path: replica_dir.join(name),
        });
    }

    // Copy pass: a file is up to date only when the replica snapshot holds
    // this fingerprint under this exact name.
    for (fingerprint, name) in &source_snapshot {
        if replica_snapshot.get(fingerprint) == Some(name) {
            continue;
        }
        plan.actions.push(SyncAction::CopyFile {
            source: source_dir.join(name),
            dest: replica_dir.join(name),
        });
    }

    for name in source_listing.dirs.difference(&replica_listing.dirs) {
        plan.actions.push(SyncAction::CreateDir {
            path: replica_dir.join(name),
        });
    }

    Ok(LevelPlan {
        plan,
        source_dirs: source_listing.dirs,
    })
}

/// Aggregate the full-tree mutation set without applying anything.
///
/// Missing replica directories (including the root) planned as creations;
/// recursion follows source subdirectories only, since replica-only subtrees
/// are removed wholesale at their own level.
pub fn plan_tree(source_dir: &Path, replica_dir: &Path) -> Result<SyncPlan, SyncError> {
    let mut plan = SyncPlan::default();
    if !replica_dir.exists() {
        plan.actions.push(SyncAction::CreateDir {
            path: replica_dir.to_path_buf(),
        });
    }
    plan_tree_into(source_dir, replica_dir, &mut plan)?;
    Ok(plan)
}

fn plan_tree_into(
    source_dir: &Path,
    replica_dir: &Path,
    out: &mut SyncPlan,
) -> Result<(), SyncError> {
    let level = plan_level(source_dir, replica_dir)?;
    out.actions.extend(level.plan.actions);
    for name in &level.source_dirs {
        plan_tree_into(&source_dir.join(name), &replica_dir.join(name), out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let replica = temp.path().join("replica");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&replica).unwrap();
        (temp, source, replica)
    }

    #[test]
    fn test_identical_levels_plan_nothing() {
        let (_temp, source, replica) = setup();
        fs::write(source.join("a.txt"), b"hello").unwrap();
        fs::write(replica.join("a.txt"), b"hello").unwrap();

        let level = plan_level(&source, &replica).unwrap();
        assert!(level.plan.is_empty());
    }

    #[test]
    fn test_missing_replica_level_plans_full_copy() {
        let (temp, source, _replica) = setup();
        fs::write(source.join("a.txt"), b"hello").unwrap();
        fs::create_dir(source.join("sub")).unwrap();

        let missing = temp.path().join("not-there");
        let level = plan_level(&source, &missing).unwrap();
        assert_eq!(level.plan.copies(), 1);
        assert_eq!(level.plan.dir_creates(), 1);
        assert_eq!(level.plan.file_deletes(), 0);
        assert_eq!(level.source_dirs.len(), 1);
    }

    #[test]
    fn test_renamed_identical_content_schedules_stale_name_delete() {
        let (_temp, source, replica) = setup();
        fs::write(source.join("a.txt"), b"hello").unwrap();
        fs::write(replica.join("b.txt"), b"hello").unwrap();

        let level = plan_level(&source, &replica).unwrap();
        assert_eq!(level.plan.file_deletes(), 1);
        assert_eq!(level.plan.copies(), 1);
        assert!(level
            .plan
            .actions
            .contains(&SyncAction::DeleteFile {
                path: replica.join("b.txt")
            }));
    }

    #[test]
    fn test_duplicate_content_leftover_is_caught_past_snapshot_collapse() {
        let (_temp, source, replica) = setup();
        fs::write(source.join("a.txt"), b"same").unwrap();
        // Both replica files share a fingerprint; the snapshot collapses them
        // to one entry, but the stale-name pass sees the full listing.
        fs::write(replica.join("a.txt"), b"same").unwrap();
        fs::write(replica.join("z.txt"), b"same").unwrap();

        let level = plan_level(&source, &replica).unwrap();
        assert_eq!(level.plan.file_deletes(), 1);
        assert!(level
            .plan
            .actions
            .contains(&SyncAction::DeleteFile {
                path: replica.join("z.txt")
            }));
        assert_eq!(level.plan.copies(), 0);
    }

    #[test]
    fn test_replica_only_directory_scheduled_for_removal() {
        let (_temp, source, replica) = setup();
        fs::create_dir(replica.join("stale")).unwrap();
        fs::write(replica.join("stale").join("f.txt"), b"x").unwrap();

        let level = plan_level(&source, &replica).unwrap();
        assert_eq!(level.plan.dir_removes(), 1);
        assert!(level
            .plan
            .actions
            .contains(&SyncAction::RemoveDirTree {
                path: replica.join("stale")
            }));
    }

    #[test]
    fn test_plan_tree_descends_into_source_subdirectories() {
        let (_temp, source, replica) = setup();
        fs::create_dir(source.join("d1")).unwrap();
        fs::write(source.join("d1").join("f.txt"), b"x").unwrap();

        let plan = plan_tree(&source, &replica).unwrap();
        assert_eq!(plan.dir_creates(), 1);
        assert_eq!(plan.copies(), 1);
    }

    #[test]
    fn test_plan_tree_includes_missing_replica_root() {
        let (temp, source, _replica) = setup();
        fs::write(source.join("a.txt"), b"x").unwrap();

        let missing = temp.path().join("fresh");
        let plan = plan_tree(&source, &missing).unwrap();
        assert_eq!(plan.dir_creates(), 1);
        assert_eq!(plan.copies(), 1);
    }

    #[test]
    fn test_missing_source_is_surfaced() {
        let (temp, _source, replica) = setup();
        let missing = temp.path().join("vanished");
        match plan_level(&missing, &replica) {
            Err(SyncError::PathNotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected PathNotFound, got {:?}", other),
        }
    }
}
