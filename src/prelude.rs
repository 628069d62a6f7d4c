//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use render_rename::prelude::*;
//! ```

// Core
pub use crate::core::config::{CollisionPolicy, Config, DEFAULT_MARKER};
pub use crate::core::errors::{RenameError, Result};
pub use crate::core::paths::resolve_root;

// Logging
pub use crate::logger::jsonl::JsonlWriter;

// Rename
pub use crate::rename::marker::{Marker, strip_marker};
pub use crate::rename::renamer::{PassReport, Renamer, RenamerConfig, RunReport};
