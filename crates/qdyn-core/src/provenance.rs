//! Schema version stamped on every persisted chain descriptor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `major.minor.patch` version of a stored payload layout.
///
/// Readers accept payloads from the same major line whose minor version is not
/// newer than their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Breaking layout changes.
    pub major: u32,
    /// Additive fields.
    pub minor: u32,
    /// Fixes that leave the layout alone.
    pub patch: u32,
}

impl SchemaVersion {
    /// Builds a version triple.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns true when a payload written under `other` can be read by this version.
    pub fn reads(&self, other: &SchemaVersion) -> bool {
        self.major == other.major && self.minor >= other.minor
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
