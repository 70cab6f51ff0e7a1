use anyhow::Result;
use glob::Pattern;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

use super::manifest::MANIFEST_FILE;

/// Find every release manifest of one package, at any depth.
///
/// Directory structure: `<root>/<slug>/**/release.json`
#[tracing::instrument(skip(runtime, root))]
pub fn find_release_manifests<R: Runtime + ?Sized>(
    runtime: &R,
    root: &Path,
    slug: &str,
) -> Result<Vec<PathBuf>> {
    if !runtime.exists(root) {
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/{}/**/{}",
        escaped(root),
        Pattern::escape(slug),
        MANIFEST_FILE
    );
    runtime.glob(&pattern)
}

/// Find the manifests of all packages of all types.
///
/// Directory structure: `<root>/<type>/<package>/<version>/release.json`
#[tracing::instrument(skip(runtime, root))]
pub fn find_all_manifests<R: Runtime + ?Sized>(runtime: &R, root: &Path) -> Result<Vec<PathBuf>> {
    if !runtime.exists(root) {
        return Ok(Vec::new());
    }

    let pattern = format!("{}/*/*/*/{}", escaped(root), MANIFEST_FILE);
    runtime.glob(&pattern)
}

fn escaped(root: &Path) -> String {
    let root = root.to_string_lossy();
    Pattern::escape(root.trim_end_matches(['/', '\\']))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    #[test]
    fn test_find_release_manifests() {
        let mut runtime = MockRuntime::new();

        // --- Setup Paths ---
        let root = PathBuf::from("/srv/packages");
        let manifest = root.join("plugins/foo/1.0/release.json");

        // --- 1. Check Root Exists ---
        runtime
            .expect_exists()
            .with(eq(root.clone()))
            .returning(|_| true);

        // --- 2. Recursive glob under the package ---
        let expected = manifest.clone();
        runtime
            .expect_glob()
            .with(eq("/srv/packages/plugins/foo/**/release.json"))
            .returning(move |_| Ok(vec![expected.clone()]));

        // --- Execute & Verify ---
        let found = find_release_manifests(&runtime, &root, "plugins/foo").unwrap();
        assert_eq!(found, vec![manifest]);
    }

    #[test]
    fn test_find_release_manifests_escapes_slug() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/srv/packages/");

        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_glob()
            .with(eq("/srv/packages/plugins/[*]/**/release.json"))
            .returning(|_| Ok(vec![]));

        let found = find_release_manifests(&runtime, &root, "plugins/*").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_find_release_manifests_no_root() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/non-existent");

        runtime
            .expect_exists()
            .with(eq(root.clone()))
            .returning(|_| false);

        let found = find_release_manifests(&runtime, &root, "plugins/foo").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_find_all_manifests() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/srv/packages");

        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_glob()
            .with(eq("/srv/packages/*/*/*/release.json"))
            .returning(|_| {
                Ok(vec![
                    PathBuf::from("/srv/packages/plugins/foo/1.0/release.json"),
                    PathBuf::from("/srv/packages/themes/bar/2.0/release.json"),
                ])
            });

        let found = find_all_manifests(&runtime, &root).unwrap();
        assert_eq!(found.len(), 2);
    }
}
