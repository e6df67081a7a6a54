//! Filesystem utilities.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Recursively copy a directory.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create directory: {}", dst.display()))?;

    for entry in fs::read_dir(src)
        .with_context(|| format!("failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_all(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    src_path.display(),
                    dst_path.display()
                )
            })?;
        }
    }
    Ok(())
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Compare two files byte for byte.
///
/// Used by the packager to make re-runs idempotent: an already-copied,
/// content-equal destination is left untouched.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let meta_a = fs::metadata(a)
        .with_context(|| format!("failed to stat: {}", a.display()))?;
    let meta_b = fs::metadata(b)
        .with_context(|| format!("failed to stat: {}", b.display()))?;

    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut fa = fs::File::open(a)
        .with_context(|| format!("failed to open: {}", a.display()))?;
    let mut fb = fs::File::open(b)
        .with_context(|| format!("failed to open: {}", b.display()))?;

    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];
    loop {
        let n_a = fa.read(&mut buf_a)?;
        let n_b = fb.read(&mut buf_b)?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Check whether a directory exists and contains any entry.
pub fn dir_is_populated(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_all() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("file.txt"), "content").unwrap();
        fs::write(src.join("nested/deep.txt"), "deep").unwrap();

        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("file.txt")).unwrap(), "content");
        assert_eq!(fs::read_to_string(dst.join("nested/deep.txt")).unwrap(), "deep");
    }

    #[test]
    fn test_files_identical() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        let c = tmp.path().join("c");

        fs::write(&a, "same bytes").unwrap();
        fs::write(&b, "same bytes").unwrap();
        fs::write(&c, "different!").unwrap();

        assert!(files_identical(&a, &b).unwrap());
        assert!(!files_identical(&a, &c).unwrap());
    }

    #[test]
    fn test_relative_path() {
        let base = Path::new("/build/out");
        let path = Path::new("/build/out/lib/libfoo.a");

        assert_eq!(relative_path(base, path), PathBuf::from("lib/libfoo.a"));
    }

    #[test]
    fn test_dir_is_populated() {
        let tmp = TempDir::new().unwrap();
        assert!(!dir_is_populated(tmp.path()));

        fs::write(tmp.path().join("x"), "").unwrap();
        assert!(dir_is_populated(tmp.path()));
    }
}
