//! Runtime abstraction for filesystem access.
//!
//! The catalog never touches `std::fs` directly; it goes through [`Runtime`]
//! so discovery can be driven by a mock in tests.
//!
//! # Structure
//!
//! - `fs` - File reads and glob-based discovery
//! - `path` - Lexical path helpers (confinement checks, relative display)

mod fs;
pub mod path;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use path::{is_confined_relative, relative_display};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;

    /// Expand a glob pattern into the matching paths.
    ///
    /// Paths are returned in traversal order (lexicographic within each
    /// directory). Entries that cannot be read are skipped.
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        self.glob_impl(pattern)
    }
}
