//! Artifact copy rules.
//!
//! Packaging is data, not imperative copying: an [`ArtifactSet`] is an
//! ordered table of [`CopyRule`]s that can be validated and tested without
//! touching the filesystem.

use serde::{Deserialize, Serialize};

/// A single copy rule: glob files under `src_subdir` into `dest_subdir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyRule {
    /// Subdirectory of the build output root to match under ("" = root).
    #[serde(default)]
    pub src_subdir: String,

    /// Glob pattern, relative to `src_subdir` (e.g. `**/*.a`).
    pub pattern: String,

    /// Destination subdirectory inside the package output root.
    pub dest_subdir: String,

    /// Preserve the relative path below the match root; false flattens to
    /// just the file name.
    #[serde(default)]
    pub keep_path: bool,
}

impl CopyRule {
    /// Create a flattening rule.
    pub fn flatten(pattern: &str, dest_subdir: &str) -> Self {
        CopyRule {
            src_subdir: String::new(),
            pattern: pattern.to_string(),
            dest_subdir: dest_subdir.to_string(),
            keep_path: false,
        }
    }

    /// Create a path-preserving rule.
    pub fn keep(pattern: &str, dest_subdir: &str) -> Self {
        CopyRule {
            keep_path: true,
            ..Self::flatten(pattern, dest_subdir)
        }
    }
}

/// An ordered set of copy rules defining the package layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSet {
    pub rules: Vec<CopyRule>,
}

impl ArtifactSet {
    /// The canonical layout: headers into `include/`, static and shared
    /// libraries into `lib/`, dynamic-loadable binaries into `bin/`.
    pub fn default_layout() -> Self {
        ArtifactSet {
            rules: vec![
                CopyRule::keep("**/*.h", "include"),
                CopyRule::keep("**/*.hpp", "include"),
                CopyRule::flatten("**/*.a", "lib"),
                CopyRule::flatten("**/*.lib", "lib"),
                CopyRule::flatten("**/*.so", "lib"),
                CopyRule::flatten("**/*.dylib", "lib"),
                CopyRule::flatten("**/*.dll", "bin"),
            ],
        }
    }

    /// Runtime artifacts a resolved dependency contributes to the build
    /// tree: dynamic-loadable binaries staged flat into `bin/` so built and
    /// test executables can load them.
    pub fn runtime_imports() -> Self {
        ArtifactSet {
            rules: vec![
                CopyRule::flatten("**/*.dll", "bin"),
                CopyRule::flatten("**/*.dylib", "bin"),
            ],
        }
    }

    /// Append descriptor-declared rules after the defaults.
    pub fn with_extra_rules(mut self, extra: &[CopyRule]) -> Self {
        self.rules.extend(extra.iter().cloned());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_targets() {
        let set = ArtifactSet::default_layout();

        let headers: Vec<_> = set
            .rules
            .iter()
            .filter(|r| r.dest_subdir == "include")
            .collect();
        assert!(headers.iter().all(|r| r.keep_path));

        let libs: Vec<_> = set
            .rules
            .iter()
            .filter(|r| r.dest_subdir == "lib")
            .collect();
        assert!(libs.iter().all(|r| !r.keep_path));
        assert!(libs.iter().any(|r| r.pattern.ends_with("*.a")));
        assert!(libs.iter().any(|r| r.pattern.ends_with("*.lib")));

        assert!(set
            .rules
            .iter()
            .any(|r| r.dest_subdir == "bin" && r.pattern.ends_with("*.dll")));
    }

    #[test]
    fn test_runtime_imports_target_bin() {
        let set = ArtifactSet::runtime_imports();

        assert!(set
            .rules
            .iter()
            .all(|r| r.dest_subdir == "bin" && !r.keep_path));
        assert!(set.rules.iter().any(|r| r.pattern.ends_with("*.dll")));
        assert!(set.rules.iter().any(|r| r.pattern.ends_with("*.dylib")));
    }

    #[test]
    fn test_with_extra_rules_preserves_order() {
        let extra = vec![CopyRule::flatten("**/*.pdb", "lib")];
        let set = ArtifactSet::default_layout().with_extra_rules(&extra);

        assert_eq!(set.rules.last().unwrap().pattern, "**/*.pdb");
    }

    #[test]
    fn test_rule_toml_round_trip() {
        let rule: CopyRule = toml::from_str(
            r#"
pattern = "**/*.dll"
dest_subdir = "bin"
"#,
        )
        .unwrap();

        assert_eq!(rule.src_subdir, "");
        assert!(!rule.keep_path);
        assert_eq!(rule.dest_subdir, "bin");
    }
}
