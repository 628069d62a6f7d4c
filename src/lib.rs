#![forbid(unsafe_code)]

//! render_rename (rrn) — strips a render-tag marker from output folders and
//! the frames inside them.
//!
//! A render pipeline tags every camera output folder and each frame in it with
//! a marker such as `-Camera` (`Scene-Camera/Shot-Camera_0001.png`). A run
//! makes two passes over a root directory:
//! 1. **File pass** — strip the marker from regular files inside each marked
//!    immediate subdirectory
//! 2. **Directory pass** — strip the marker from those subdirectories' names
//!
//! # Library usage
//!
//! ```rust,no_run
//! use render_rename::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = Config::load(None)?;
//! let mut renamer = Renamer::new(RenamerConfig::from_config(&config.rename)?, None);
//! let report = renamer.run(std::path::Path::new("/renders/shot_010"))?;
//! println!("renamed {} entries", report.renamed_count());
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod rename;
