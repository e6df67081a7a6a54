//! Local dependency cache.
//!
//! Located packages are installed into `~/.stevedore/cache` before the build
//! uses them. Installs are idempotent: a content fingerprint of the source
//! package decides whether a cached copy is still current, so re-resolving
//! an unchanged requirement touches nothing. A per-requirement lock keeps
//! concurrent resolver lookups from fetching the same package twice.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::core::requirement::Requirement;
use crate::util::fs::{copy_dir_all, ensure_dir, remove_dir_all_if_exists};

/// Suffix of the per-package fingerprint file, written next to the
/// installed package directory.
const FINGERPRINT_SUFFIX: &str = ".fingerprint";

/// The dependency install cache.
pub struct DepCache {
    cache_dir: PathBuf,

    /// Per-requirement locks, keyed by the full reference string.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DepCache {
    /// Create a cache rooted at `cache_dir`.
    pub fn new(cache_dir: PathBuf) -> Self {
        DepCache {
            cache_dir,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get the cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Install a located package into the cache, returning its install path.
    ///
    /// No-op when the cached copy's fingerprint matches the source package.
    pub fn install(&self, req: &Requirement, source_dir: &Path) -> Result<PathBuf> {
        let lock = self.lock_for(req);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let dest = self.cache_dir.join(req.dir_components());
        let fp_path = fingerprint_path(&dest);
        let fingerprint = fingerprint_dir(source_dir)
            .with_context(|| format!("failed to fingerprint package for `{}`", req))?;

        if dest.is_dir() {
            let cached = std::fs::read_to_string(&fp_path).unwrap_or_default();
            if cached.trim() == fingerprint {
                tracing::debug!("cache hit for {}", req);
                return Ok(dest);
            }
            tracing::debug!("cache stale for {}, refreshing", req);
            remove_dir_all_if_exists(&dest)?;
        } else {
            tracing::debug!("cache miss for {}", req);
        }

        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }
        copy_dir_all(source_dir, &dest)
            .with_context(|| format!("failed to install `{}` into the cache", req))?;
        std::fs::write(&fp_path, &fingerprint)
            .with_context(|| format!("failed to write fingerprint: {}", fp_path.display()))?;

        Ok(dest)
    }

    fn lock_for(&self, req: &Requirement) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(req.to_string()).or_default().clone()
    }
}

fn fingerprint_path(install_dir: &Path) -> PathBuf {
    let name = install_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    install_dir.with_file_name(format!("{}{}", name, FINGERPRINT_SUFFIX))
}

/// Content fingerprint of a package directory: sorted relative paths plus
/// file contents, hashed.
fn fingerprint_dir(dir: &Path) -> Result<String> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    let mut hasher = Sha256::new();
    for file in &files {
        let rel = file.strip_prefix(dir).unwrap_or(file);
        hasher.update(rel.to_string_lossy().as_bytes());
        hasher.update([0]);
        let contents = std::fs::read(file)
            .with_context(|| format!("failed to read: {}", file.display()))?;
        hasher.update(&contents);
        hasher.update([0]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed_source(root: &Path) -> PathBuf {
        let pkg = root.join("pkg");
        std::fs::create_dir_all(pkg.join("lib")).unwrap();
        std::fs::write(pkg.join("package.toml"), "libs = [\"foo\"]\n").unwrap();
        std::fs::write(pkg.join("lib/libfoo.a"), b"archive").unwrap();
        pkg
    }

    #[test]
    fn test_install_copies_package() {
        let tmp = TempDir::new().unwrap();
        let src = seed_source(tmp.path());
        let cache = DepCache::new(tmp.path().join("cache"));
        let req = Requirement::new("foo", "1.0", "_", "stable");

        let installed = cache.install(&req, &src).unwrap();

        assert!(installed.join("package.toml").is_file());
        assert!(installed.join("lib/libfoo.a").is_file());
        assert!(fingerprint_path(&installed).is_file());
    }

    #[test]
    fn test_reinstall_is_noop_when_unchanged() {
        let tmp = TempDir::new().unwrap();
        let src = seed_source(tmp.path());
        let cache = DepCache::new(tmp.path().join("cache"));
        let req = Requirement::new("foo", "1.0", "_", "stable");

        let first = cache.install(&req, &src).unwrap();
        let marker = first.join("marker");
        std::fs::write(&marker, "left by first install").unwrap();

        // Same content: the cached copy (marker included) must survive.
        let second = cache.install(&req, &src).unwrap();
        assert_eq!(first, second);
        assert!(marker.is_file());
    }

    #[test]
    fn test_reinstall_refreshes_when_source_changed() {
        let tmp = TempDir::new().unwrap();
        let src = seed_source(tmp.path());
        let cache = DepCache::new(tmp.path().join("cache"));
        let req = Requirement::new("foo", "1.0", "_", "stable");

        let installed = cache.install(&req, &src).unwrap();
        std::fs::write(src.join("lib/libfoo.a"), b"new archive").unwrap();

        cache.install(&req, &src).unwrap();
        assert_eq!(
            std::fs::read(installed.join("lib/libfoo.a")).unwrap(),
            b"new archive"
        );
    }

    #[test]
    fn test_fingerprint_is_content_sensitive() {
        let tmp = TempDir::new().unwrap();
        let src = seed_source(tmp.path());

        let before = fingerprint_dir(&src).unwrap();
        std::fs::write(src.join("lib/libfoo.a"), b"changed").unwrap();
        let after = fingerprint_dir(&src).unwrap();

        assert_ne!(before, after);
    }
}
