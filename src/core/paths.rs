//! Root resolution and small path helpers shared by both passes.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::errors::{RenameError, Result};

/// Resolve the directory a run operates on.
///
/// `None` means the process's current working directory. The result is
/// canonical, so reports show the real location even when invoked through a
/// symlink or a relative path.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let requested = match explicit {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().map_err(|e| RenameError::io(".", e))?,
    };

    let canonical = fs::canonicalize(&requested).map_err(|e| RenameError::io(&requested, e))?;
    if !canonical.is_dir() {
        return Err(RenameError::InvalidConfig {
            details: format!("root {} is not a directory", canonical.display()),
        });
    }
    Ok(canonical)
}

/// Path of an entry named `name` next to `path`.
pub fn sibling(path: &Path, name: &OsStr) -> PathBuf {
    path.parent()
        .map_or_else(|| PathBuf::from(name), |parent| parent.join(name))
}

/// Whether two paths name the same filesystem entry.
///
/// On case-insensitive filesystems a case-only rename sees its own target as
/// existing; this tells that apart from a genuine collision.
pub fn is_same_entry(a: &Path, b: &Path) -> bool {
    let (Ok(ma), Ok(mb)) = (fs::symlink_metadata(a), fs::symlink_metadata(b)) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        ma.dev() == mb.dev() && ma.ino() == mb.ino()
    }
    #[cfg(not(unix))]
    {
        let _ = (ma, mb);
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(ca), Ok(cb)) => ca == cb,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_explicit_root_canonically() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("shots");
        fs::create_dir(&nested).unwrap();

        let resolved = resolve_root(Some(nested.join("..").join("shots").as_path())).unwrap();
        assert_eq!(resolved, fs::canonicalize(&nested).unwrap());
    }

    #[test]
    fn resolves_cwd_when_no_root_given() {
        let resolved = resolve_root(None).unwrap();
        assert_eq!(
            resolved,
            fs::canonicalize(env::current_dir().unwrap()).unwrap()
        );
    }

    #[test]
    fn missing_root_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_root(Some(dir.path().join("absent").as_path())).unwrap_err();
        assert_eq!(err.code(), "RRN-3002");
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("frame.png");
        fs::write(&file, b"x").unwrap();
        let err = resolve_root(Some(file.as_path())).unwrap_err();
        assert_eq!(err.code(), "RRN-1001");
    }

    #[test]
    fn sibling_keeps_parent() {
        let p = Path::new("/renders/A-Camera");
        assert_eq!(sibling(p, OsStr::new("A")), PathBuf::from("/renders/A"));
    }

    #[test]
    fn same_entry_detection() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        fs::write(&a, b"1").unwrap();
        fs::write(&b, b"2").unwrap();

        assert!(is_same_entry(&a, &a));
        assert!(is_same_entry(&a, &dir.path().join(".").join("a.png")));
        assert!(!is_same_entry(&a, &b));
        assert!(!is_same_entry(&a, &dir.path().join("missing.png")));
    }
}
