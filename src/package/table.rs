use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::version::Version;

/// A resolved release: one row of a [`VersionTable`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReleaseEntry {
    pub version: String,
    pub date: Value,
    /// Absolute download URL of the release archive.
    pub package: String,
}

/// Versions of one package in discovery order.
///
/// Holds at most one entry per version string. Serializes as a JSON object
/// keyed by version, preserving insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionTable {
    entries: Vec<ReleaseEntry>,
}

impl VersionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry` unless its version is already present.
    ///
    /// Returns false when the entry was dropped as a duplicate; the first
    /// release discovered for a version always wins.
    pub fn insert(&mut self, entry: ReleaseEntry) -> bool {
        if self.contains(&entry.version) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn contains(&self, version: &str) -> bool {
        self.get(version).is_some()
    }

    /// Exact lookup by version string.
    pub fn get(&self, version: &str) -> Option<&ReleaseEntry> {
        self.entries.iter().find(|e| e.version == version)
    }

    /// The most recently discovered entry.
    pub fn last_discovered(&self) -> Option<&ReleaseEntry> {
        self.entries.last()
    }

    /// The entry with the greatest version; the earliest discovered wins ties.
    pub fn highest(&self) -> Option<&ReleaseEntry> {
        self.entries.iter().reduce(|best, candidate| {
            if Version::from(candidate.version.as_str()) > Version::from(best.version.as_str()) {
                candidate
            } else {
                best
            }
        })
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.version.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for VersionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.version, entry)?;
        }
        map.end()
    }
}
