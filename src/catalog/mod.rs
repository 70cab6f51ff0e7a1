//! Package version catalog.
//!
//! A [`Catalog`] answers the four queries of the action endpoint (`index`,
//! `show`, `latest`, `check`). Every query rebuilds the version table from
//! the manifests on disk; nothing is cached between calls.

mod config;
mod response;

use anyhow::Context;
use log::{debug, warn};

use crate::error::{CatalogError, Result};
use crate::package::{
    ReleaseEntry, ReleaseManifest, Version, VersionTable, absolute_download_url,
    find_all_manifests, find_release_manifests,
};
use crate::runtime::{Runtime, is_confined_relative, relative_display};

pub use config::{CatalogConfig, DEFAULT_ROOT_PATH, DEFAULT_ROOT_URL, LatestPolicy};
pub use response::{LatestRelease, PackageListing, ReleaseDetails, ShowResponse, UpdateCheck};

/// Version keyword accepted by `show` in place of a concrete version.
const LATEST_KEYWORD: &str = "latest";

pub struct Catalog<R: Runtime> {
    runtime: R,
    config: CatalogConfig,
}

impl<R: Runtime> Catalog<R> {
    pub fn new(runtime: R, config: CatalogConfig) -> Self {
        Self { runtime, config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Build the version table of `slug` from its release manifests.
    ///
    /// Manifests that cannot be read or parsed, or that lack a version or
    /// an artifact, are skipped with a warning. Fails with `NotFound` when
    /// no usable manifest remains.
    #[tracing::instrument(skip(self))]
    pub fn discover_releases(&self, slug: &str) -> Result<VersionTable> {
        let slug = validate_slug(slug)?;
        let manifests =
            find_release_manifests(&self.runtime, &self.config.downloads_root_path, slug)
                .with_context(|| format!("Failed to scan releases of {}", slug))?;

        let mut table = VersionTable::new();
        for path in manifests {
            let manifest = match ReleaseManifest::load(&self.runtime, &path) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!("Skipping release manifest {:?}: {:#}", path, e);
                    continue;
                }
            };

            let Some(version) = manifest.version.clone() else {
                warn!("Skipping release manifest {:?}: no version", path);
                continue;
            };
            let Some(artifact) = manifest.artifact() else {
                warn!("Skipping release manifest {:?}: no package", path);
                continue;
            };

            let entry = ReleaseEntry {
                package: absolute_download_url(&artifact.zip, &self.config.downloads_root_url),
                date: manifest.date.clone(),
                version,
            };
            let version = entry.version.clone();
            if !table.insert(entry) {
                debug!("Ignoring duplicate version {} from {:?}", version, path);
            }
        }

        if table.is_empty() {
            return Err(CatalogError::not_found(format!(
                "Package not found: {}",
                slug
            )));
        }

        debug!("Found {} version(s) of {}", table.len(), slug);
        Ok(table)
    }

    /// List every manifest under the downloads root, relative to it.
    #[tracing::instrument(skip(self))]
    pub fn list_packages(&self) -> Result<Vec<String>> {
        let root = &self.config.downloads_root_path;
        let manifests =
            find_all_manifests(&self.runtime, root).context("Failed to scan packages")?;

        Ok(manifests
            .iter()
            .map(|path| relative_display(root, path))
            .collect())
    }

    /// Show every version of a package, or a single one.
    ///
    /// `latest` (in any case) is answered like [`Catalog::latest`].
    #[tracing::instrument(skip(self))]
    pub fn show(&self, slug: &str, version: Option<&str>) -> Result<ShowResponse> {
        let table = self.discover_releases(slug)?;

        let Some(version) = version else {
            return Ok(ShowResponse::Package(PackageListing {
                versions: table,
                slug: slug.to_string(),
            }));
        };

        if version.eq_ignore_ascii_case(LATEST_KEYWORD) {
            let entry = self.latest_entry(&table, slug)?;
            return Ok(ShowResponse::Latest(LatestRelease {
                entry: entry.clone(),
                slug: slug.to_string(),
            }));
        }

        let entry = table.get(version).ok_or_else(|| {
            CatalogError::not_found(format!("Package version not found: {}", version))
        })?;
        Ok(ShowResponse::Release(ReleaseDetails::new(entry, slug)))
    }

    #[tracing::instrument(skip(self))]
    pub fn latest(&self, slug: &str) -> Result<LatestRelease> {
        let table = self.discover_releases(slug)?;
        let entry = self.latest_entry(&table, slug)?;
        Ok(LatestRelease {
            entry: entry.clone(),
            slug: slug.to_string(),
        })
    }

    /// Compare `current_version` against the latest release.
    ///
    /// The version is validated before the package is looked up. An empty
    /// version counts as missing rather than as a version older than any
    /// release.
    #[tracing::instrument(skip(self))]
    pub fn check(&self, slug: &str, current_version: Option<&str>) -> Result<UpdateCheck> {
        let current = current_version
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CatalogError::invalid_argument("No current version provided"))?;

        let table = self.discover_releases(slug)?;
        let latest = self.latest_entry(&table, slug)?;

        if Version::from(latest.version.as_str()).is_newer_than(current) {
            debug!("{}: {} is newer than {}", slug, latest.version, current);
            Ok(UpdateCheck::update_available(latest, current, slug))
        } else {
            Ok(UpdateCheck::up_to_date(latest, slug))
        }
    }

    fn latest_entry<'t>(&self, table: &'t VersionTable, slug: &str) -> Result<&'t ReleaseEntry> {
        let entry = match self.config.latest_policy {
            LatestPolicy::LastDiscovered => table.last_discovered(),
            LatestPolicy::HighestVersion => table.highest(),
        };
        entry.ok_or_else(|| CatalogError::not_found(format!("Package not found: {}", slug)))
    }
}

/// Reject slugs that are empty or would escape the downloads root.
fn validate_slug(slug: &str) -> Result<&str> {
    if slug.is_empty() {
        return Err(CatalogError::invalid_argument("No slug provided"));
    }

    let trimmed = slug.trim_end_matches('/');
    if !is_confined_relative(std::path::Path::new(trimmed)) {
        return Err(CatalogError::invalid_argument(format!(
            "Invalid slug: {}",
            slug
        )));
    }

    Ok(trimmed)
}
