//! Configure-step command construction.
//!
//! Translates a build plan into the native build tool's command lines. The
//! translation is pure and deterministic: identical plans always yield
//! byte-identical command lines, which upstream cache keys rely on.

use std::path::Path;

use crate::core::plan::BuildPlan;
use crate::util::process::ProcessBuilder;

/// Flag emitted when the `shared` option is on.
const SHARED_FLAG: &str = "-DBUILD_SHARED_LIBS=ON";

/// Flag emitted when the `build_tests` option is on.
const BUILD_TESTS_FLAG: &str = "-DBUILD_TEST:BOOL=ON";

/// Build the configure invocation for a plan.
///
/// Argument order is fixed: source/build dirs, generator, build type,
/// dependency prefix path, then one flag per enabled option.
pub fn configure_command(
    tool: &Path,
    source_dir: &Path,
    build_dir: &Path,
    plan: &BuildPlan,
) -> ProcessBuilder {
    let mut cmd = ProcessBuilder::new(tool)
        .arg("-S")
        .arg(source_dir)
        .arg("-B")
        .arg(build_dir);

    if let Some(generator) = plan.platform.generator() {
        cmd = cmd.arg("-G").arg(generator);
    }

    cmd = cmd.arg(format!(
        "-DCMAKE_BUILD_TYPE={}",
        plan.platform.build_type.as_tool_config()
    ));

    if !plan.deps.is_empty() {
        let prefix = plan
            .prefix_paths()
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(";");
        cmd = cmd.arg(format!("-DCMAKE_PREFIX_PATH={}", prefix));
    }

    if plan.options.shared {
        cmd = cmd.arg(SHARED_FLAG);
    }

    if plan.options.build_tests {
        cmd = cmd.arg(BUILD_TESTS_FLAG);
    }

    cmd
}

/// Build the compile invocation for a plan.
pub fn build_command(tool: &Path, build_dir: &Path, plan: &BuildPlan) -> ProcessBuilder {
    ProcessBuilder::new(tool)
        .arg("--build")
        .arg(build_dir)
        .arg("--parallel")
        .arg("--config")
        .arg(plan.platform.build_type.as_tool_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::BuildOptions;
    use crate::core::plan::ResolvedDependency;
    use crate::core::platform::{BuildType, Platform};
    use crate::core::requirement::Requirement;
    use std::path::PathBuf;

    fn linux_platform(build_type: BuildType) -> Platform {
        Platform {
            os: "linux".to_string(),
            compiler: "gcc".to_string(),
            arch: "x86_64".to_string(),
            build_type,
        }
    }

    fn plan_with(options: BuildOptions, deps: Vec<ResolvedDependency>) -> BuildPlan {
        BuildPlan::new(deps, options, linux_platform(BuildType::Release))
    }

    #[test]
    fn test_configure_is_deterministic() {
        let plan = plan_with(
            BuildOptions {
                shared: true,
                build_tests: true,
            },
            vec![ResolvedDependency {
                requirement: Requirement::new("Boost", "1.60.0", "lasote", "stable"),
                install_path: PathBuf::from("/cache/Boost"),
                libs: vec!["boost_graph".to_string()],
            }],
        );

        let first = configure_command(Path::new("cmake"), Path::new("/src"), Path::new("/b"), &plan);
        let second =
            configure_command(Path::new("cmake"), Path::new("/src"), Path::new("/b"), &plan);

        assert_eq!(first.display_command(), second.display_command());
    }

    #[test]
    fn test_static_build_omits_shared_flag() {
        let plan = plan_with(BuildOptions::default(), vec![]);
        let cmd = configure_command(Path::new("cmake"), Path::new("/src"), Path::new("/b"), &plan);

        let line = cmd.display_command();
        assert!(!line.contains("BUILD_SHARED_LIBS"));
        assert!(!line.contains("BUILD_TEST"));
        assert!(line.contains("-DCMAKE_BUILD_TYPE=Release"));
    }

    #[test]
    fn test_option_flags_and_prefix_path() {
        let plan = plan_with(
            BuildOptions {
                shared: true,
                build_tests: true,
            },
            vec![
                ResolvedDependency {
                    requirement: Requirement::new("Boost", "1.60.0", "lasote", "stable"),
                    install_path: PathBuf::from("/cache/Boost"),
                    libs: vec![],
                },
                ResolvedDependency {
                    requirement: Requirement::new("spdlog", "0.9.0", "memsharded", "stable"),
                    install_path: PathBuf::from("/cache/spdlog"),
                    libs: vec![],
                },
            ],
        );

        let line = configure_command(Path::new("cmake"), Path::new("/src"), Path::new("/b"), &plan)
            .display_command();

        assert!(line.contains("-DBUILD_SHARED_LIBS=ON"));
        assert!(line.contains("-DBUILD_TEST:BOOL=ON"));
        assert!(line.contains("-DCMAKE_PREFIX_PATH=/cache/Boost;/cache/spdlog"));
        assert!(line.contains("-G Unix Makefiles"));
    }

    #[test]
    fn test_build_command_uses_build_type() {
        let plan = plan_with(BuildOptions::default(), vec![]);
        let line = build_command(Path::new("cmake"), Path::new("/b"), &plan).display_command();

        assert_eq!(line, "cmake --build /b --parallel --config Release");
    }
}
