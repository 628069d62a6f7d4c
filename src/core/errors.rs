//! RRN-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, RenameError>;

/// Top-level error type for render_rename.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("[RRN-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[RRN-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[RRN-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[RRN-2001] name collision: {} already exists (source {})", .to.display(), .from.display())]
    NameCollision { from: PathBuf, to: PathBuf },

    #[error("[RRN-2002] stripping the marker would leave an empty name: {path}")]
    EmptyName { path: PathBuf },

    #[error("[RRN-3001] permission denied for {path}")]
    PermissionDenied { path: PathBuf },

    #[error("[RRN-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[RRN-3101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },
}

impl RenameError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "RRN-1001",
            Self::MissingConfig { .. } => "RRN-1002",
            Self::ConfigParse { .. } => "RRN-1003",
            Self::NameCollision { .. } => "RRN-2001",
            Self::EmptyName { .. } => "RRN-2002",
            Self::PermissionDenied { .. } => "RRN-3001",
            Self::Io { .. } => "RRN-3002",
            Self::Serialization { .. } => "RRN-3101",
        }
    }

    /// Whether the failure is confined to a single entry, so a pass may carry
    /// on with its siblings.
    #[must_use]
    pub const fn is_item_level(&self) -> bool {
        matches!(
            self,
            Self::NameCollision { .. }
                | Self::EmptyName { .. }
                | Self::PermissionDenied { .. }
                | Self::Io { .. }
        )
    }

    /// The filesystem path the error is about, if it names one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::MissingConfig { path }
            | Self::EmptyName { path }
            | Self::PermissionDenied { path }
            | Self::Io { path, .. } => Some(path),
            Self::NameCollision { from, .. } => Some(from),
            Self::InvalidConfig { .. } | Self::ConfigParse { .. } | Self::Serialization { .. } => {
                None
            }
        }
    }

    /// Convenience constructor for IO errors with a known path.
    ///
    /// `PermissionDenied` is split out so operators see it under its own code.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == ErrorKind::PermissionDenied {
            Self::PermissionDenied { path }
        } else {
            Self::Io { path, source }
        }
    }
}

impl From<serde_json::Error> for RenameError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for RenameError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for RenameError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}
