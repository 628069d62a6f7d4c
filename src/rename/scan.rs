//! One-level listing of candidate directories and candidate files.
//!
//! Listings are rebuilt from the filesystem on every call and never cached.
//! Symlinks are not followed: only real directories under the root and
//! regular files inside them qualify.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::errors::{RenameError, Result};
use crate::rename::marker::Marker;

/// Entries selected by a listing plus any per-entry read failures.
#[derive(Debug, Default)]
pub struct Listing {
    pub candidates: Vec<PathBuf>,
    pub errors: Vec<RenameError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Want {
    Directories,
    Files,
}

/// Immediate subdirectories of `root` whose names contain the marker.
///
/// Fails only when `root` itself cannot be read.
pub fn candidate_directories(root: &Path, marker: &Marker) -> Result<Listing> {
    list(root, marker, Want::Directories)
}

/// Immediate regular files of `dir` whose names contain the marker.
pub fn candidate_files(dir: &Path, marker: &Marker) -> Result<Listing> {
    list(dir, marker, Want::Files)
}

fn list(dir: &Path, marker: &Marker, want: Want) -> Result<Listing> {
    let entries = fs::read_dir(dir).map_err(|e| RenameError::io(dir, e))?;
    let mut listing = Listing::default();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                listing.errors.push(RenameError::io(dir, e));
                continue;
            }
        };

        if !marker.is_in(&entry.file_name()) {
            continue;
        }

        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                listing.errors.push(RenameError::io(&path, e));
                continue;
            }
        };

        let selected = match want {
            Want::Directories => file_type.is_dir(),
            Want::Files => file_type.is_file(),
        };
        if selected {
            listing.candidates.push(path);
        }
    }

    // read_dir order is platform-defined; sort so reports are stable.
    listing.candidates.sort();
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Marker {
        Marker::new("-Camera").unwrap()
    }

    fn names(listing: &Listing) -> Vec<String> {
        listing
            .candidates
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn lists_only_marked_directories() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("B-Camera")).unwrap();
        fs::create_dir(root.path().join("A-Camera")).unwrap();
        fs::create_dir(root.path().join("Plain")).unwrap();
        fs::write(root.path().join("file-Camera.png"), b"x").unwrap();

        let listing = candidate_directories(root.path(), &camera()).unwrap();
        assert_eq!(names(&listing), vec!["A-Camera", "B-Camera"]);
        assert!(listing.errors.is_empty());
    }

    #[test]
    fn lists_only_marked_regular_files() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("Scene-Camera");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("f-Camera_01.png"), b"1").unwrap();
        fs::write(dir.join("notes.txt"), b"n").unwrap();
        fs::create_dir(dir.join("nested-Camera")).unwrap();

        let listing = candidate_files(&dir, &camera()).unwrap();
        assert_eq!(names(&listing), vec!["f-Camera_01.png"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_candidates() {
        let root = tempfile::tempdir().unwrap();
        let real = root.path().join("real");
        fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, root.path().join("link-Camera")).unwrap();
        fs::write(real.join("target.png"), b"t").unwrap();
        std::os::unix::fs::symlink(real.join("target.png"), real.join("alias-Camera.png"))
            .unwrap();

        assert!(
            candidate_directories(root.path(), &camera())
                .unwrap()
                .candidates
                .is_empty()
        );
        assert!(
            candidate_files(&real, &camera())
                .unwrap()
                .candidates
                .is_empty()
        );
    }

    #[test]
    fn unreadable_root_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let err = candidate_directories(&root.path().join("missing"), &camera()).unwrap_err();
        assert_eq!(err.code(), "RRN-3002");
    }
}
