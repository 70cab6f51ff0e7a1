//! Package release data
//!
//! This module provides the building blocks of the catalog: release manifest
//! parsing, manifest discovery, the per-package version table and version
//! ordering.

mod discovery;
mod manifest;
mod table;
pub mod url;
mod version;

pub use discovery::{find_all_manifests, find_release_manifests};
pub use manifest::{Artifact, MANIFEST_FILE, ReleaseManifest};
pub use table::{ReleaseEntry, VersionTable};
pub use url::absolute_download_url;
pub use version::{Version, compare_versions};
