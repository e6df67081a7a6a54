//! Artifact packaging.
//!
//! The terminal pipeline stage: applies an [`ArtifactSet`] to the build
//! output root and stages matched files into the package output root.
//! Re-running with unchanged inputs is idempotent; content-equal
//! destinations are left untouched.
//!
//! Packaging is NOT atomic: a collision or I/O failure can leave a
//! partially-written destination. Package into a fresh or empty directory.

pub mod rules;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::util::fs::{ensure_dir, files_identical, relative_path};

pub use rules::{ArtifactSet, CopyRule};

/// Error during packaging.
#[derive(Debug, Error)]
pub enum PackageError {
    /// Two distinct source files flatten to the same destination.
    #[error(
        "destination collision: `{}` and `{}` both map to `{}`",
        first.display(), second.display(), dest.display()
    )]
    Collision {
        dest: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// A glob pattern in a rule is invalid.
    #[error("invalid pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Filesystem failure while staging.
    #[error("packaging I/O error at `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// What a packaging run staged.
#[derive(Debug, Default)]
pub struct PackageReport {
    /// (source, destination) pairs, in destination order.
    pub copied: Vec<(PathBuf, PathBuf)>,
}

impl PackageReport {
    /// Number of files in the package.
    pub fn file_count(&self) -> usize {
        self.copied.len()
    }
}

/// Apply the rule set to `build_root`, staging into `out_root`.
pub fn package(
    set: &ArtifactSet,
    build_root: &Path,
    out_root: &Path,
) -> Result<PackageReport, PackageError> {
    let planned = plan_copies(set, build_root, out_root)?;

    let mut report = PackageReport::default();
    for (dest, src) in planned {
        if let Some(parent) = dest.parent() {
            ensure_dir(parent).map_err(|e| PackageError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let already_current = dest.exists()
            && files_identical(&src, &dest).map_err(|e| PackageError::Io {
                path: dest.clone(),
                source: e,
            })?;

        if !already_current {
            std::fs::copy(&src, &dest).map_err(|e| PackageError::Io {
                path: dest.clone(),
                source: anyhow::Error::new(e),
            })?;
        }

        tracing::debug!("packaged {} -> {}", src.display(), dest.display());
        report.copied.push((src, dest));
    }

    Ok(report)
}

/// Match all rules and assign destinations, detecting collisions before any
/// file is written.
fn plan_copies(
    set: &ArtifactSet,
    build_root: &Path,
    out_root: &Path,
) -> Result<BTreeMap<PathBuf, PathBuf>, PackageError> {
    let mut planned: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

    for rule in &set.rules {
        let base = if rule.src_subdir.is_empty() {
            build_root.to_path_buf()
        } else {
            build_root.join(&rule.src_subdir)
        };
        if !base.is_dir() {
            continue;
        }

        for src in match_files(&base, &rule.pattern)? {
            let dest_name: PathBuf = if rule.keep_path {
                relative_path(&base, &src)
            } else {
                src.file_name().map(PathBuf::from).unwrap_or_default()
            };
            let dest = out_root.join(&rule.dest_subdir).join(dest_name);

            match planned.get(&dest) {
                Some(prev) if prev != &src => {
                    return Err(PackageError::Collision {
                        dest,
                        first: prev.clone(),
                        second: src,
                    });
                }
                _ => {
                    planned.insert(dest, src);
                }
            }
        }
    }

    Ok(planned)
}

/// Files under `base` matching `pattern`, sorted for deterministic order.
fn match_files(base: &Path, pattern: &str) -> Result<Vec<PathBuf>, PackageError> {
    let full_pattern = base.join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let entries = glob::glob(&pattern_str).map_err(|e| PackageError::Pattern {
        pattern: pattern.to_string(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("glob error: {}", e);
                None
            }
        })
        .collect();

    files.sort();
    files.dedup();
    Ok(files)
}
