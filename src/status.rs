//! Divergence reporting: what a pass would do, without mutating anything.

use crate::error::SyncError;
use crate::plan::{self, SyncPlan};
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

/// Recursive counts for one side of the mirror
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TreeSummary {
    pub files: u64,
    pub dirs: u64,
    pub bytes: u64,
}

/// Pending mutation counts from a dry-run plan
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PendingChanges {
    pub copies: usize,
    pub file_deletes: usize,
    pub dir_creates: usize,
    pub dir_removes: usize,
}

impl PendingChanges {
    fn from_plan(plan: &SyncPlan) -> Self {
        Self {
            copies: plan.copies(),
            file_deletes: plan.file_deletes(),
            dir_creates: plan.dir_creates(),
            dir_removes: plan.dir_removes(),
        }
    }
}

/// Full status report for a source/replica pair
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub source: TreeSummary,
    pub replica: TreeSummary,
    pub pending: PendingChanges,
    pub in_sync: bool,
}

/// Count files, directories, and bytes under `root`.
///
/// A missing root reports as empty rather than an error, so a replica that
/// has not been created yet still summarizes.
pub fn summarize_tree(root: &Path) -> Result<TreeSummary, SyncError> {
    if !root.exists() {
        return Ok(TreeSummary::default());
    }

    let mut summary = TreeSummary::default();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| root.to_path_buf());
            match e.into_io_error() {
                Some(io) => SyncError::from_io(&path, io),
                None => SyncError::PathNotFound(path),
            }
        })?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            summary.dirs += 1;
        } else if file_type.is_file() {
            summary.files += 1;
            summary.bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    Ok(summary)
}

/// Assemble the status report: per-side summaries plus the dry-run plan
pub fn status_report(source_dir: &Path, replica_dir: &Path) -> Result<StatusReport, SyncError> {
    let plan = plan::plan_tree(source_dir, replica_dir)?;
    let pending = PendingChanges::from_plan(&plan);
    Ok(StatusReport {
        source: summarize_tree(source_dir)?,
        replica: summarize_tree(replica_dir)?,
        pending,
        in_sync: plan.is_empty(),
    })
}

/// Format a status report as human-readable text.
pub fn format_status_text(report: &StatusReport) -> String {
    let mut out = String::new();
    out.push_str("Mirror Status\n\n");
    out.push_str("Source\n");
    out.push_str(&format!("  Files: {}\n", report.source.files));
    out.push_str(&format!("  Directories: {}\n", report.source.dirs));
    out.push_str(&format!("  Bytes: {}\n\n", report.source.bytes));
    out.push_str("Replica\n");
    out.push_str(&format!("  Files: {}\n", report.replica.files));
    out.push_str(&format!("  Directories: {}\n", report.replica.dirs));
    out.push_str(&format!("  Bytes: {}\n\n", report.replica.bytes));
    if report.in_sync {
        out.push_str("In sync: yes\n");
    } else {
        out.push_str("Pending changes\n");
        out.push_str(&format!("  Copies: {}\n", report.pending.copies));
        out.push_str(&format!("  File deletions: {}\n", report.pending.file_deletes));
        out.push_str(&format!(
            "  Directory creations: {}\n",
            report.pending.dir_creates
        ));
        out.push_str(&format!(
            "  Directory removals: {}\n\n",
            report.pending.dir_removes
        ));
        out.push_str("In sync: no\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_summarize_counts_files_dirs_and_bytes() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), b"four").unwrap();
        fs::create_dir(temp.path().join("d1")).unwrap();
        fs::write(temp.path().join("d1").join("b.txt"), b"x").unwrap();

        let summary = summarize_tree(temp.path()).unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.dirs, 1);
        assert_eq!(summary.bytes, 5);
    }

    #[test]
    fn test_missing_root_summarizes_as_empty() {
        let temp = TempDir::new().unwrap();
        let summary = summarize_tree(&temp.path().join("nope")).unwrap();
        assert_eq!(summary.files, 0);
        assert_eq!(summary.dirs, 0);
    }

    #[test]
    fn test_report_flags_divergence() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let replica = temp.path().join("replica");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&replica).unwrap();
        fs::write(source.join("a.txt"), b"x").unwrap();

        let report = status_report(&source, &replica).unwrap();
        assert!(!report.in_sync);
        assert_eq!(report.pending.copies, 1);

        let text = format_status_text(&report);
        assert!(text.contains("In sync: no"));
        assert!(text.contains("Copies: 1"));
    }

    #[test]
    fn test_report_on_identical_trees_is_in_sync() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let replica = temp.path().join("replica");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&replica).unwrap();
        fs::write(source.join("a.txt"), b"x").unwrap();
        fs::write(replica.join("a.txt"), b"x").unwrap();

        let report = status_report(&source, &replica).unwrap();
        assert!(report.in_sync);
        assert!(format_status_text(&report).contains("In sync: yes"));
    }
}
