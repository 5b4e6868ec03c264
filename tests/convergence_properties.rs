//! Property tests: reconciliation converges from arbitrary replica states
//! and a converged pair plans no further mutations.

use proptest::prelude::*;
use replica::plan;
use replica::reconcile::Reconciler;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Relative file paths drawn from fixed name pools so a path component is
/// never both a file and a directory within one generated tree.
fn arb_rel_path() -> impl Strategy<Value = PathBuf> {
    let dirs = prop::sample::select(vec!["", "d1", "d2", "d1/n1", "d2/n2"]);
    let names = prop::sample::select(vec!["a.txt", "b.txt", "c.bin", "notes.md"]);
    (dirs, names).prop_map(|(dir, name)| {
        if dir.is_empty() {
            PathBuf::from(name)
        } else {
            PathBuf::from(dir).join(name)
        }
    })
}

fn arb_tree() -> impl Strategy<Value = BTreeMap<PathBuf, Vec<u8>>> {
    prop::collection::btree_map(arb_rel_path(), prop::collection::vec(any::<u8>(), 0..48), 0..10)
}

/// Write a generated tree to disk. Content is prefixed with the relative
/// path, so no two files in the same directory ever share a fingerprint and
/// the collision-collapse rule stays out of the property's way.
fn materialize(root: &Path, tree: &BTreeMap<PathBuf, Vec<u8>>) {
    fs::create_dir_all(root).unwrap();
    for (rel, content) in tree {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut unique = rel.to_string_lossy().into_owned().into_bytes();
        unique.push(0);
        unique.extend_from_slice(content);
        fs::write(&path, &unique).unwrap();
    }
}

fn read_tree(root: &Path) -> (BTreeMap<PathBuf, Vec<u8>>, BTreeSet<PathBuf>) {
    let mut files = BTreeMap::new();
    let mut dirs = BTreeSet::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(root).unwrap().to_path_buf();
        if entry.file_type().is_dir() {
            dirs.insert(rel);
        } else {
            files.insert(rel, fs::read(entry.path()).unwrap());
        }
    }
    (files, dirs)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn reconcile_converges_and_is_idempotent(
        source_tree in arb_tree(),
        replica_tree in arb_tree(),
    ) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let replica = temp.path().join("replica");
        materialize(&source, &source_tree);
        materialize(&replica, &replica_tree);

        Reconciler::new().reconcile(&source, &replica).unwrap();

        // Convergence: replica file contents and directory structure match
        // the source exactly (contents are unique by construction).
        prop_assert_eq!(read_tree(&source), read_tree(&replica));

        // Idempotence: nothing left to do.
        let followup = plan::plan_tree(&source, &replica).unwrap();
        prop_assert!(followup.is_empty(), "leftover actions: {:?}", followup.actions);
    }
}
