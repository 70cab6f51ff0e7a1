//! Path utility functions for confinement checks and display.

use std::path::{Component, Path};

/// Check that a path is relative and stays below whatever it is joined onto.
///
/// Rejects absolute paths, Windows prefixes, and any `..` component. `.`
/// components are tolerated. The path must name at least one component.
pub fn is_confined_relative(path: &Path) -> bool {
    let mut has_normal = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => has_normal = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    has_normal
}

/// Render `path` relative to `root` with `/` separators.
///
/// Falls back to the full path when `path` is not under `root`.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_is_confined_relative_accepts_nested() {
        assert!(is_confined_relative(Path::new("plugins/my-plugin")));
        assert!(is_confined_relative(Path::new("./plugins/my-plugin")));
        assert!(is_confined_relative(Path::new("solo")));
    }

    #[test]
    fn test_is_confined_relative_rejects_escape() {
        assert!(!is_confined_relative(Path::new("../etc")));
        assert!(!is_confined_relative(Path::new("plugins/../../etc")));
        assert!(!is_confined_relative(Path::new("/etc/passwd")));
    }

    #[test]
    fn test_is_confined_relative_rejects_empty() {
        assert!(!is_confined_relative(Path::new("")));
        assert!(!is_confined_relative(Path::new(".")));
    }

    #[test]
    fn test_relative_display_strips_root() {
        let root = PathBuf::from("/srv/packages");
        let path = root.join("plugins").join("foo").join("1.0").join("release.json");
        assert_eq!(
            relative_display(&root, &path),
            "plugins/foo/1.0/release.json"
        );
    }

    #[test]
    fn test_relative_display_outside_root() {
        let root = PathBuf::from("/srv/packages");
        let path = PathBuf::from("other/release.json");
        assert_eq!(relative_display(&root, &path), "other/release.json");
    }
}
