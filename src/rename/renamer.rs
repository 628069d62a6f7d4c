//! Two-pass renamer: strip the marker from files inside marked directories,
//! then from the directories themselves.
//!
//! Pipeline: list marked dirs -> list marked files per dir -> rename files
//! -> re-list marked dirs -> rename dirs.
//!
//! Every path is derived from the root passed in; the process working
//! directory is never changed. Each entry is its own unit of work: a
//! collision or I/O failure is recorded and the pass moves on to the next
//! sibling. Only an unreadable root aborts a pass.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::core::config::{CollisionPolicy, RenameConfig};
use crate::core::errors::{RenameError, Result};
use crate::core::paths;
use crate::logger::jsonl::{EventType, JsonlWriter, LogEntry, Severity};
use crate::rename::marker::Marker;
use crate::rename::scan;

// ──────────────────── configuration ────────────────────

/// Settings for one renamer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamerConfig {
    pub marker: Marker,
    pub on_collision: CollisionPolicy,
}

impl RenamerConfig {
    pub fn from_config(cfg: &RenameConfig) -> Result<Self> {
        Ok(Self {
            marker: Marker::new(cfg.marker.clone())?,
            on_collision: cfg.on_collision,
        })
    }
}

impl Default for RenamerConfig {
    fn default() -> Self {
        Self {
            marker: Marker::default(),
            on_collision: CollisionPolicy::Skip,
        }
    }
}

// ──────────────────── report types ────────────────────

/// Which kind of entry a record is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// Why a candidate was deliberately left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NameCollision,
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameRecord {
    pub kind: EntryKind,
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipRecord {
    pub kind: EntryKind,
    pub path: PathBuf,
    pub reason: SkipReason,
    pub error_code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub kind: EntryKind,
    pub path: PathBuf,
    pub error_code: String,
    pub error: String,
    /// The failure touched only this entry; the pass went on with its siblings.
    pub item_level: bool,
}

/// Outcome of one pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassReport {
    pub renamed: Vec<RenameRecord>,
    pub skipped: Vec<SkipRecord>,
    pub failed: Vec<FailureRecord>,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl PassReport {
    /// True when nothing was skipped or failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Outcome of a full run: file pass then directory pass.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub root: PathBuf,
    pub marker: String,
    pub on_collision: CollisionPolicy,
    pub files: PassReport,
    pub directories: PassReport,
}

impl RunReport {
    #[must_use]
    pub fn renamed_count(&self) -> usize {
        self.files.renamed.len() + self.directories.renamed.len()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.files.skipped.len() + self.directories.skipped.len()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.files.failed.len() + self.directories.failed.len()
    }

    /// Every candidate found by either pass was renamed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.files.is_complete() && self.directories.is_complete()
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    #[allow(clippy::cast_possible_truncation)]
    serializer.serialize_u64(duration.as_millis() as u64)
}

// ──────────────────── renamer ────────────────────

/// Strips the marker from candidate files and directories under a root.
pub struct Renamer {
    config: RenamerConfig,
    logger: Option<JsonlWriter>,
}

impl Renamer {
    /// Create a renamer with the given config and optional activity log.
    pub fn new(config: RenamerConfig, logger: Option<JsonlWriter>) -> Self {
        Self { config, logger }
    }

    #[must_use]
    pub fn config(&self) -> &RenamerConfig {
        &self.config
    }

    /// File pass then directory pass, never interleaved.
    pub fn run(&mut self, root: &Path) -> Result<RunReport> {
        self.log_event(
            LogEntry::new(EventType::RunStart, Severity::Info)
                .with_path(root)
                .with_details(format!(
                    "marker={:?} on_collision={}",
                    self.config.marker.as_str(),
                    self.config.on_collision
                )),
        );

        let outcome = self.strip_marker_from_files(root).and_then(|files| {
            let directories = self.strip_marker_from_directories(root)?;
            Ok((files, directories))
        });

        let (files, directories) = match outcome {
            Ok(passes) => passes,
            Err(e) => {
                self.log_event(
                    LogEntry::new(EventType::Failed, Severity::Error)
                        .with_path(root)
                        .with_error(&e),
                );
                self.flush_log();
                return Err(e);
            }
        };

        let report = RunReport {
            root: root.to_path_buf(),
            marker: self.config.marker.as_str().to_string(),
            on_collision: self.config.on_collision,
            files,
            directories,
        };

        self.log_event(
            LogEntry::new(EventType::RunComplete, Severity::Info)
                .with_path(root)
                .with_details(format!(
                    "renamed={} skipped={} failed={}",
                    report.renamed_count(),
                    report.skipped_count(),
                    report.failed_count()
                )),
        );
        self.flush_log();
        Ok(report)
    }

    /// Rename marked regular files inside every marked directory of `root`.
    ///
    /// Directory names are left untouched here so file paths stay valid for
    /// the whole pass.
    pub fn strip_marker_from_files(&mut self, root: &Path) -> Result<PassReport> {
        let start = Instant::now();
        let mut report = PassReport::default();

        let dirs = scan::candidate_directories(root, &self.config.marker)?;
        for error in dirs.errors {
            self.record_failure(EntryKind::Directory, root, &error, &mut report);
        }

        for dir in &dirs.candidates {
            let files = match scan::candidate_files(dir, &self.config.marker) {
                Ok(files) => files,
                Err(error) if error.is_item_level() => {
                    self.record_failure(EntryKind::Directory, dir, &error, &mut report);
                    continue;
                }
                Err(error) => return Err(error),
            };
            for error in files.errors {
                self.record_failure(EntryKind::File, dir, &error, &mut report);
            }
            for file in &files.candidates {
                self.rename_entry(EntryKind::File, file, &mut report);
            }
        }

        report.duration = start.elapsed();
        Ok(report)
    }

    /// Rename every marked directory of `root`, from a fresh listing.
    pub fn strip_marker_from_directories(&mut self, root: &Path) -> Result<PassReport> {
        let start = Instant::now();
        let mut report = PassReport::default();

        let dirs = scan::candidate_directories(root, &self.config.marker)?;
        for error in dirs.errors {
            self.record_failure(EntryKind::Directory, root, &error, &mut report);
        }
        for dir in &dirs.candidates {
            self.rename_entry(EntryKind::Directory, dir, &mut report);
        }

        report.duration = start.elapsed();
        Ok(report)
    }

    // ──────────────────── per-entry work ────────────────────

    fn rename_entry(&mut self, kind: EntryKind, path: &Path, report: &mut PassReport) {
        let Some(name) = path.file_name() else {
            return;
        };
        // Names without the marker are never touched.
        let Some(new_name) = self.config.marker.strip(name) else {
            return;
        };
        if new_name.is_empty() {
            let error = RenameError::EmptyName {
                path: path.to_path_buf(),
            };
            self.record_skip(kind, path, SkipReason::EmptyName, &error, report);
            return;
        }

        let target = paths::sibling(path, &new_name);
        match self.move_entry(path, &target) {
            Ok(()) => {
                self.log_event(
                    LogEntry::new(EventType::Renamed, Severity::Info)
                        .with_kind(kind.as_str())
                        .with_path(path)
                        .with_target(&target),
                );
                report.renamed.push(RenameRecord {
                    kind,
                    from: path.to_path_buf(),
                    to: target,
                });
            }
            Err(error @ RenameError::NameCollision { .. }) => {
                self.record_skip(kind, path, SkipReason::NameCollision, &error, report);
            }
            Err(error) => self.record_failure(kind, path, &error, report),
        }
    }

    fn move_entry(&self, from: &Path, to: &Path) -> Result<()> {
        if self.config.on_collision == CollisionPolicy::Skip
            && fs::symlink_metadata(to).is_ok()
            && !paths::is_same_entry(from, to)
        {
            return Err(RenameError::NameCollision {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
            });
        }
        fs::rename(from, to).map_err(|e| RenameError::io(from, e))
    }

    // ──────────────────── bookkeeping ────────────────────

    fn record_skip(
        &mut self,
        kind: EntryKind,
        path: &Path,
        reason: SkipReason,
        error: &RenameError,
        report: &mut PassReport,
    ) {
        self.log_event(
            LogEntry::new(EventType::Skipped, Severity::Warning)
                .with_kind(kind.as_str())
                .with_path(path)
                .with_error(error),
        );
        report.skipped.push(SkipRecord {
            kind,
            path: path.to_path_buf(),
            reason,
            error_code: error.code().to_string(),
            message: error.to_string(),
        });
    }

    fn record_failure(
        &mut self,
        kind: EntryKind,
        fallback_path: &Path,
        error: &RenameError,
        report: &mut PassReport,
    ) {
        let path = error.path().unwrap_or(fallback_path);
        self.log_event(
            LogEntry::new(EventType::Failed, Severity::Error)
                .with_kind(kind.as_str())
                .with_path(path)
                .with_error(error),
        );
        report.failed.push(FailureRecord {
            kind,
            path: path.to_path_buf(),
            error_code: error.code().to_string(),
            error: error.to_string(),
            item_level: error.is_item_level(),
        });
    }

    fn log_event(&mut self, entry: LogEntry) {
        if let Some(logger) = self.logger.as_mut() {
            logger.write_entry(&entry);
        }
    }

    fn flush_log(&mut self) {
        if let Some(logger) = self.logger.as_mut() {
            logger.flush();
        }
    }
}

// ──────────────────── tests ────────────────────
