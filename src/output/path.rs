//! Artifact naming and atomic writes
//!
//! Each run writes two files into the output directory:
//!
//! - `activity-{resource}-{YYYYMMDD-HHMMSS}.{txt|json}` - the report
//! - `usernames-{resource}-{YYYYMMDD-HHMMSS}.txt` - the ranked username list
//!
//! Files go through a [`tempfile::NamedTempFile`] in the target directory and
//! are then persisted over the final name, so an interrupted run never leaves
//! a truncated report behind.

use super::{OutputError, OutputResult, ReportFormat};
use crate::identifier::ResourceId;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Paths of the two artifacts produced by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Report file
    pub report: PathBuf,
    /// Username list file
    pub usernames: PathBuf,
}

impl ArtifactPaths {
    /// Build artifact paths stamped with `at`
    pub fn new(
        dir: &Path,
        resource: &ResourceId,
        format: ReportFormat,
        at: DateTime<Utc>,
    ) -> Self {
        let stamp = at.format("%Y%m%d-%H%M%S");
        Self {
            report: dir.join(format!(
                "activity-{}-{}.{}",
                resource,
                stamp,
                format.extension()
            )),
            usernames: dir.join(format!("usernames-{resource}-{stamp}.txt")),
        }
    }
}

/// Write `contents` to `path` atomically
///
/// Creates the parent directory if needed, writes a temp file next to the
/// target, syncs it and renames it over `path`.
pub fn write_atomic(path: &Path, contents: &str) -> OutputResult<()> {
    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent_dir)
        .map_err(|e| OutputError::IoError(format!("Failed to create {}: {e}", parent_dir.display())))?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)
        .map_err(|e| OutputError::IoError(format!("Failed to create temp file: {e}")))?;
    temp_file
        .write_all(contents.as_bytes())
        .map_err(|e| OutputError::IoError(format!("Failed to write to temp file: {e}")))?;
    temp_file
        .flush()
        .map_err(|e| OutputError::IoError(format!("Failed to flush temp file: {e}")))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| OutputError::IoError(format!("Failed to sync temp file: {e}")))?;

    temp_file
        .persist(path)
        .map_err(|e| OutputError::IoError(format!("Failed to persist {}: {e}", path.display())))?;

    debug!(path = %path.display(), bytes = contents.len(), "Artifact written");
    Ok(())
}

/// Write the report and username list
pub fn write_artifacts(
    paths: &ArtifactPaths,
    report: &str,
    usernames: &str,
) -> OutputResult<()> {
    write_atomic(&paths.report, report)?;
    write_atomic(&paths.usernames, usernames)?;
    info!(
        report = %paths.report.display(),
        usernames = %paths.usernames.display(),
        "Report written"
    );
    Ok(())
}
