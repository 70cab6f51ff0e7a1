use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default directory holding `<type>/<package>/<version>/release.json`.
pub const DEFAULT_ROOT_PATH: &str = "packages";

/// Default public URL the downloads root is served from.
pub const DEFAULT_ROOT_URL: &str = "http://localhost:8080/packages";

/// Which entry of a version table counts as "latest".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LatestPolicy {
    /// The last manifest found while scanning the package directory.
    ///
    /// Matches what existing update clients were served. It only yields the
    /// newest release when directory order follows release order.
    #[default]
    LastDiscovered,
    /// The entry with the greatest version.
    HighestVersion,
}

impl fmt::Display for LatestPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatestPolicy::LastDiscovered => write!(f, "last-discovered"),
            LatestPolicy::HighestVersion => write!(f, "highest-version"),
        }
    }
}

impl FromStr for LatestPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last-discovered" => Ok(LatestPolicy::LastDiscovered),
            "highest-version" => Ok(LatestPolicy::HighestVersion),
            _ => anyhow::bail!(
                "Unknown latest policy: {}. Expected last-discovered or highest-version.",
                s
            ),
        }
    }
}

/// Settings injected into a [`Catalog`](super::Catalog) at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Directory scanned for release manifests.
    pub downloads_root_path: PathBuf,
    /// URL relative artifact references are joined onto.
    pub downloads_root_url: String,
    pub latest_policy: LatestPolicy,
}

impl CatalogConfig {
    pub fn new(downloads_root_path: impl Into<PathBuf>, downloads_root_url: impl Into<String>) -> Self {
        Self {
            downloads_root_path: downloads_root_path.into(),
            downloads_root_url: downloads_root_url.into(),
            latest_policy: LatestPolicy::default(),
        }
    }

    pub fn with_latest_policy(mut self, policy: LatestPolicy) -> Self {
        self.latest_policy = policy;
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_PATH, DEFAULT_ROOT_URL)
    }
}
