//! Configuration system: TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{RenameError, Result};

/// Marker stamped by the render pipeline onto camera output folders and frames.
pub const DEFAULT_MARKER: &str = "-Camera";

/// Full render_rename configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub rename: RenameConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// What to strip and how to treat existing targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenameConfig {
    pub marker: String,
    pub on_collision: CollisionPolicy,
}

/// Optional JSONL activity trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Unset means no activity log is written.
    pub jsonl_path: Option<PathBuf>,
}

/// Filesystem paths used by rrn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

/// Behavior when the stripped name already exists as a different entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Leave both entries alone and report the collision.
    #[default]
    Skip,
    /// Let the platform rename replace the existing target.
    Overwrite,
}

impl CollisionPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollisionPolicy {
    type Err = RenameError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(RenameError::ConfigParse {
                context: "on_collision",
                details: format!("expected \"skip\" or \"overwrite\", got {other:?}"),
            }),
        }
    }
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            on_collision: CollisionPolicy::Skip,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[RRN-CONFIG] WARNING: HOME not set, falling back to /tmp for config path"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        Self {
            config_file: home_dir
                .join(".config")
                .join("render-rename")
                .join("config.toml"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, env_var)
    }

    /// Same as [`Config::load`] with an injectable environment lookup.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|e| RenameError::io(&path_buf, e))?;
            toml::from_str::<Self>(&raw)?
        } else if is_explicit_path {
            return Err(RenameError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(lookup)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for the activity log.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Render the effective config as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("RRN_MARKER") {
            self.rename.marker = raw;
        }

        if let Some(raw) = lookup("RRN_ON_COLLISION") {
            self.rename.on_collision = raw.parse().map_err(|_| RenameError::ConfigParse {
                context: "env",
                details: format!("RRN_ON_COLLISION={raw:?}: expected skip or overwrite"),
            })?;
        }

        if let Some(raw) = lookup("RRN_JSONL_LOG") {
            self.logging.jsonl_path = Some(PathBuf::from(raw));
        }

        Ok(())
    }

    /// Check invariants that every load path must satisfy.
    pub fn validate(&self) -> Result<()> {
        validate_marker(&self.rename.marker)
    }
}

/// A marker must be non-empty and must not be able to form a path component.
pub fn validate_marker(marker: &str) -> Result<()> {
    if marker.is_empty() {
        return Err(RenameError::InvalidConfig {
            details: "rename.marker must not be empty".to_string(),
        });
    }
    if marker.contains('\0') {
        return Err(RenameError::InvalidConfig {
            details: "rename.marker must not contain NUL".to_string(),
        });
    }
    if marker.chars().any(std::path::is_separator) {
        return Err(RenameError::InvalidConfig {
            details: format!("rename.marker must not contain a path separator, got {marker:?}"),
        });
    }
    Ok(())
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}
