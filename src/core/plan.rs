//! The immutable build plan handed from the resolver to the configurator.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::options::BuildOptions;
use crate::core::platform::Platform;
use crate::core::requirement::Requirement;

/// A requirement located on disk, with its link libraries.
///
/// Produced by the resolver; immutable for the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    /// The requirement this satisfies
    pub requirement: Requirement,

    /// Root of the installed package in the local cache
    pub install_path: PathBuf,

    /// Ordered library names this package links as
    pub libs: Vec<String>,
}

/// Everything the configure step needs, fixed at resolution time.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    /// Resolved dependencies in declaration order
    pub deps: Vec<ResolvedDependency>,

    /// Validated build options
    pub options: BuildOptions,

    /// Target platform
    pub platform: Platform,
}

impl BuildPlan {
    /// Create a plan. Consumes its parts; the plan is not mutated afterwards.
    pub fn new(deps: Vec<ResolvedDependency>, options: BuildOptions, platform: Platform) -> Self {
        BuildPlan {
            deps,
            options,
            platform,
        }
    }

    /// Dependency install roots, in declaration order.
    pub fn prefix_paths(&self) -> Vec<&PathBuf> {
        self.deps.iter().map(|d| &d.install_path).collect()
    }

    /// All dependency link libraries, in declaration order.
    pub fn lib_names(&self) -> Vec<&str> {
        self.deps
            .iter()
            .flat_map(|d| d.libs.iter().map(String::as_str))
            .collect()
    }

    /// Serialize the plan as pretty JSON for `build --plan`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::BuildType;

    fn dep(name: &str, libs: &[&str]) -> ResolvedDependency {
        ResolvedDependency {
            requirement: Requirement::new(name, "1.0", "_", "stable"),
            install_path: PathBuf::from("/cache").join(name),
            libs: libs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_prefix_paths_in_order() {
        let plan = BuildPlan::new(
            vec![dep("b", &["b"]), dep("a", &["a1", "a2"])],
            BuildOptions::default(),
            Platform::host(BuildType::Debug),
        );

        assert_eq!(
            plan.prefix_paths(),
            vec![&PathBuf::from("/cache/b"), &PathBuf::from("/cache/a")]
        );
        assert_eq!(plan.lib_names(), vec!["b", "a1", "a2"]);
    }

    #[test]
    fn test_plan_serializes() {
        let plan = BuildPlan::new(
            vec![dep("zlib", &["z"])],
            BuildOptions::default(),
            Platform::host(BuildType::Release),
        );

        let json = plan.to_json().unwrap();
        assert!(json.contains("\"zlib\""));
        assert!(json.contains("\"release\""));
    }
}
