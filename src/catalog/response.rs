//! Wire shapes returned by catalog queries.
//!
//! Field order follows what update clients have always received.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::package::{ReleaseEntry, VersionTable};

/// Every version of a package.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PackageListing {
    pub versions: VersionTable,
    pub slug: String,
}

/// One specific version, with presentation field names.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReleaseDetails {
    pub version: String,
    pub last_updated: Value,
    pub download_link: String,
    pub slug: String,
}

impl ReleaseDetails {
    pub fn new(entry: &ReleaseEntry, slug: &str) -> Self {
        Self {
            version: entry.version.clone(),
            last_updated: entry.date.clone(),
            download_link: entry.package.clone(),
            slug: slug.to_string(),
        }
    }
}

/// The latest release of a package.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LatestRelease {
    #[serde(flatten)]
    pub entry: ReleaseEntry,
    pub slug: String,
}

/// Outcome of comparing an installed version against the latest release.
///
/// When an update exists, `new_version` carries the offered version and
/// `version` echoes the caller's. Otherwise `new_version` is absent and the
/// latest entry is returned unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UpdateCheck {
    pub version: String,
    #[serde(default)]
    pub date: Value,
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_version: Option<String>,
    pub slug: String,
}

impl UpdateCheck {
    pub fn up_to_date(latest: &ReleaseEntry, slug: &str) -> Self {
        Self {
            version: latest.version.clone(),
            date: latest.date.clone(),
            package: latest.package.clone(),
            new_version: None,
            slug: slug.to_string(),
        }
    }

    pub fn update_available(latest: &ReleaseEntry, current_version: &str, slug: &str) -> Self {
        Self {
            version: current_version.to_string(),
            date: latest.date.clone(),
            package: latest.package.clone(),
            new_version: Some(latest.version.clone()),
            slug: slug.to_string(),
        }
    }

    pub fn has_update(&self) -> bool {
        self.new_version.is_some()
    }
}

/// Result of a `show` query; which shape depends on the requested version.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ShowResponse {
    Package(PackageListing),
    Latest(LatestRelease),
    Release(ReleaseDetails),
}
