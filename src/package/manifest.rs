use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::runtime::Runtime;

/// File name of the per-version release manifest.
pub const MANIFEST_FILE: &str = "release.json";

/// Release manifest stored next to each released version.
///
/// Directory structure: `<root>/<type>/<package>/[...]/<version>/release.json`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ReleaseManifest {
    #[serde(default)]
    pub version: Option<String>,
    /// Passed through to clients as-is; manifests use both ISO dates and
    /// unix timestamps.
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub package: Option<Artifact>,
    #[serde(default)]
    pub packages: Option<Vec<Artifact>>,
}

/// A distributable archive referenced by a manifest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Artifact {
    #[serde(default)]
    pub name: Option<String>,
    /// Absolute URL or a path relative to the downloads root URL.
    pub zip: String,
}

impl ReleaseManifest {
    #[tracing::instrument(skip(runtime, path))]
    pub fn load<R: Runtime + ?Sized>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed release manifest {:?}", path))
    }

    /// The artifact clients should download.
    ///
    /// A single `package` wins over the `packages` list; from the list only
    /// the first entry is offered.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.package
            .as_ref()
            .or_else(|| self.packages.as_ref().and_then(|list| list.first()))
    }
}
