//! Package sources.
//!
//! A source is anywhere prebuilt packages can be located by reference. The
//! only kind shipped here is a local directory laid out as
//! `name/version/user/channel/`, each leaf holding a `package.toml` metadata
//! file next to the package's `include/`/`lib/`/`bin/` payload.

pub mod cache;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::requirement::Requirement;

pub use cache::DepCache;

/// Metadata file each packaged dependency carries.
pub const PACKAGE_META_NAME: &str = "package.toml";

/// Per-package metadata consumed during resolution.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageMeta {
    /// Ordered library names this package links as.
    pub libs: Vec<String>,
}

impl PackageMeta {
    /// Load metadata from an installed package directory.
    pub fn load(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(PACKAGE_META_NAME);
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read package metadata: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse package metadata: {}", path.display()))
    }

    /// The libs list, defaulting to the package name when empty.
    pub fn libs_or(&self, name: &str) -> Vec<String> {
        if self.libs.is_empty() {
            vec![name.to_string()]
        } else {
            self.libs.clone()
        }
    }
}

/// A place packages can be located by reference.
pub trait Source: Send + Sync {
    /// Human-readable source name for diagnostics.
    fn name(&self) -> String;

    /// Locate a requirement, returning its package directory if present.
    fn locate(&self, req: &Requirement) -> Result<Option<PathBuf>>;
}

/// A local directory source.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Create a source rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        DirSource { root }
    }
}

impl Source for DirSource {
    fn name(&self) -> String {
        self.root.display().to_string()
    }

    fn locate(&self, req: &Requirement) -> Result<Option<PathBuf>> {
        let dir = self.root.join(req.dir_components());
        if dir.join(PACKAGE_META_NAME).is_file() {
            Ok(Some(dir))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed_package(root: &Path, req: &Requirement, libs: &str) -> PathBuf {
        let dir = root.join(req.dir_components());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(PACKAGE_META_NAME), libs).unwrap();
        dir
    }

    #[test]
    fn test_dir_source_locates_seeded_package() {
        let tmp = TempDir::new().unwrap();
        let req = Requirement::new("Boost", "1.60.0", "lasote", "stable");
        let dir = seed_package(tmp.path(), &req, "libs = [\"boost_graph\"]");

        let source = DirSource::new(tmp.path().to_path_buf());
        assert_eq!(source.locate(&req).unwrap(), Some(dir.clone()));

        let meta = PackageMeta::load(&dir).unwrap();
        assert_eq!(meta.libs_or("Boost"), vec!["boost_graph".to_string()]);
    }

    #[test]
    fn test_dir_source_misses_unknown_package() {
        let tmp = TempDir::new().unwrap();
        let source = DirSource::new(tmp.path().to_path_buf());
        let req = Requirement::new("nope", "1.0", "_", "stable");

        assert_eq!(source.locate(&req).unwrap(), None);
    }

    #[test]
    fn test_meta_defaults_to_package_name() {
        let meta = PackageMeta::default();
        assert_eq!(meta.libs_or("zlib"), vec!["zlib".to_string()]);
    }
}
