//! Marker matching and stripping on raw entry names.
//!
//! Names are compared as bytes so that a frame with a non-UTF-8 name on Unix
//! is still normalized. Stripping removes every non-overlapping occurrence and
//! repeats until none is left, which keeps a second run a no-op even for names
//! where a removal splices a fresh occurrence together (`-Ca-Cameramera`).

#![allow(missing_docs)]

use std::ffi::{OsStr, OsString};
use std::fmt;

use memchr::memmem::Finder;

use crate::core::config::{DEFAULT_MARKER, validate_marker};
use crate::core::errors::Result;

/// A validated marker with a prebuilt substring searcher.
#[derive(Clone)]
pub struct Marker {
    text: String,
    finder: Finder<'static>,
}

impl Marker {
    /// Build a marker, rejecting values that could never be a name fragment.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        validate_marker(&text)?;
        Ok(Self::from_valid(text))
    }

    fn from_valid(text: String) -> Self {
        let finder = Finder::new(text.as_bytes()).into_owned();
        Self { text, finder }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether `name` contains the marker at least once.
    #[must_use]
    pub fn is_in(&self, name: &OsStr) -> bool {
        name_bytes(name).is_some_and(|bytes| self.finder.find(&bytes).is_some())
    }

    /// `name` with every occurrence removed, or `None` if it has none.
    #[must_use]
    pub fn strip(&self, name: &OsStr) -> Option<OsString> {
        let bytes = name_bytes(name)?;
        strip_all(&self.finder, &bytes).map(name_from_bytes)
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::from_valid(DEFAULT_MARKER.to_string())
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Marker").field(&self.text).finish()
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Marker {}

/// Remove all occurrences of `marker` from `name`.
///
/// Returns `None` when `marker` is empty or does not occur in `name`.
#[must_use]
pub fn strip_marker(name: &str, marker: &str) -> Option<String> {
    if marker.is_empty() {
        return None;
    }
    let finder = Finder::new(marker.as_bytes());
    // A UTF-8 needle only ever matches on char boundaries of a UTF-8
    // haystack, so the lossy conversion never substitutes anything.
    strip_all(&finder, name.as_bytes()).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

fn strip_all(finder: &Finder<'_>, bytes: &[u8]) -> Option<Vec<u8>> {
    finder.find(bytes)?;
    let mut current = remove_occurrences(finder, bytes);
    while finder.find(&current).is_some() {
        current = remove_occurrences(finder, &current);
    }
    Some(current)
}

fn remove_occurrences(finder: &Finder<'_>, bytes: &[u8]) -> Vec<u8> {
    let needle_len = finder.needle().len();
    let mut out = Vec::with_capacity(bytes.len());
    let mut last = 0;
    for start in finder.find_iter(bytes) {
        out.extend_from_slice(&bytes[last..start]);
        last = start + needle_len;
    }
    out.extend_from_slice(&bytes[last..]);
    out
}

#[cfg(unix)]
fn name_bytes(name: &OsStr) -> Option<std::borrow::Cow<'_, [u8]>> {
    use std::os::unix::ffi::OsStrExt;
    Some(std::borrow::Cow::Borrowed(name.as_bytes()))
}

#[cfg(unix)]
fn name_from_bytes(bytes: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes)
}

// Non-Unix names that are not valid Unicode are never treated as candidates.
#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> Option<std::borrow::Cow<'_, [u8]>> {
    name.to_str()
        .map(|s| std::borrow::Cow::Borrowed(s.as_bytes()))
}

#[cfg(not(unix))]
fn name_from_bytes(bytes: Vec<u8>) -> OsString {
    OsString::from(String::from_utf8_lossy(&bytes).into_owned())
}
