//! Stevedore.toml package descriptor parsing and schema.
//!
//! The descriptor is the central configuration file for a package build:
//! metadata, recognized option defaults, declared requirements, package
//! source directories, and extra copy rules.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::core::options::BuildOptions;
use crate::core::requirement::Requirement;
use crate::packager::rules::CopyRule;
use crate::util::config::EnvDefaults;
use crate::util::fs::read_to_string;

/// Canonical descriptor file name.
pub const DESCRIPTOR_NAME: &str = "Stevedore.toml";

/// Raw TOML schema, validated into [`Descriptor`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlDescriptor {
    package: TomlPackage,

    #[serde(default)]
    options: BuildOptions,

    /// Requirement references, `name/version[@user/channel]`.
    #[serde(default)]
    requires: Vec<String>,

    /// Local package source directories, searched in order.
    #[serde(default)]
    sources: Vec<PathBuf>,

    /// Extra copy rules appended to the default package layout.
    #[serde(default, rename = "copy")]
    copy_rules: Vec<CopyRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlPackage {
    name: String,
    version: String,
    #[serde(default)]
    license: Option<String>,
}

/// A validated package descriptor.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// License identifier
    pub license: Option<String>,

    /// Recognized option defaults
    pub options: BuildOptions,

    /// Declared requirements, in declaration order
    pub requires: Vec<Requirement>,

    /// Package source directories, resolved relative to the descriptor
    pub sources: Vec<PathBuf>,

    /// Extra copy rules
    pub copy_rules: Vec<CopyRule>,

    /// Directory containing the descriptor
    pub root: PathBuf,
}

impl Descriptor {
    /// Load and validate a descriptor file.
    pub fn load(path: &Path, defaults: &EnvDefaults) -> Result<Self> {
        let contents = read_to_string(path)?;
        let raw: TomlDescriptor = toml::from_str(&contents)
            .with_context(|| format!("failed to parse descriptor: {}", path.display()))?;

        if raw.package.name.is_empty() {
            bail!("descriptor {} has an empty package name", path.display());
        }

        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let requires = raw
            .requires
            .iter()
            .map(|reference| {
                Requirement::parse(reference, defaults)
                    .with_context(|| format!("in descriptor {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        // Source dirs are relative to the descriptor unless absolute.
        let sources = raw
            .sources
            .into_iter()
            .map(|dir| if dir.is_absolute() { dir } else { root.join(dir) })
            .collect();

        Ok(Descriptor {
            name: raw.package.name,
            version: raw.package.version,
            license: raw.package.license,
            options: raw.options,
            requires,
            sources,
            copy_rules: raw.copy_rules,
            root,
        })
    }

    /// Find `Stevedore.toml` starting at `dir` and searching upward.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        let mut current = dir.to_path_buf();
        loop {
            let candidate = current.join(DESCRIPTOR_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }
}
