//! Marker stripping: name primitive, one-level listing, and the two-pass renamer.

pub mod marker;
pub mod renamer;
pub mod scan;
