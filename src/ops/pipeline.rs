//! The build/package pipeline.
//!
//! Stages run strictly in order: resolve, configure, build, test (when
//! enabled), package (when requested). Every stage error halts the pipeline
//! immediately; nothing is staged into the package output after a failure.

use std::fmt;
use std::path::PathBuf;

use anyhow::anyhow;
use thiserror::Error;

use crate::builder::executor::{BuildError, ExecReport, Executor};
use crate::builder::testrunner::{run_tests, TestError, TestReport};
use crate::builder::{build_command, configure_command};
use crate::core::descriptor::Descriptor;
use crate::core::options::OptionError;
use crate::core::plan::BuildPlan;
use crate::core::platform::{BuildType, Platform};
use crate::packager::{self, ArtifactSet, PackageError, PackageReport};
use crate::resolver::{ResolveError, Resolver};
use crate::sources::{DepCache, DirSource, Source};
use crate::util::cancel::CancelToken;
use crate::util::config::GlobalContext;
use crate::util::diagnostic::{Diagnostic, OUTPUT_TAIL_LINES};
use crate::util::process::{find_build_tool, find_test_tool, StepOutput};

/// A pipeline stage, for failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Configure,
    Build,
    Test,
    Package,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolve => "resolution",
            Stage::Configure => "configure",
            Stage::Build => "build",
            Stage::Test => "test",
            Stage::Package => "package",
        };
        write!(f, "{}", name)
    }
}

/// Exit code for a cancelled run (shell SIGINT convention).
pub const EXIT_CANCELLED: i32 = 130;

/// Any pipeline failure, tagged with enough to report stage and exit code.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Option(#[from] OptionError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Test(#[from] TestError),

    #[error(transparent)]
    Package(#[from] PackageError),
}

impl PipelineError {
    /// The stage this failure belongs to; `None` for cancellation.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Option(_) => Some(Stage::Configure),
            PipelineError::Resolve(_) => Some(Stage::Resolve),
            PipelineError::Build(BuildError::Configure { .. }) => Some(Stage::Configure),
            PipelineError::Build(BuildError::Cancelled) => None,
            PipelineError::Build(_) => Some(Stage::Build),
            PipelineError::Test(TestError::Cancelled) => None,
            PipelineError::Test(_) => Some(Stage::Test),
            PipelineError::Package(_) => Some(Stage::Package),
        }
    }

    /// Whether the run was cancelled rather than failing.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            PipelineError::Build(BuildError::Cancelled) | PipelineError::Test(TestError::Cancelled)
        )
    }

    /// The process exit code this failure maps to.
    pub fn exit_code(&self) -> i32 {
        if self.is_cancelled() {
            return EXIT_CANCELLED;
        }
        match self {
            PipelineError::Resolve(_) => 1,
            PipelineError::Option(_) => 2,
            PipelineError::Build(_) => 2,
            PipelineError::Test(_) => 3,
            PipelineError::Package(_) => 4,
        }
    }

    /// Captured tool output for build/test failures.
    pub fn tool_output(&self) -> Option<&StepOutput> {
        match self {
            PipelineError::Build(e) => e.step_output(),
            PipelineError::Test(e) => e.step_output(),
            _ => None,
        }
    }

    /// Render the failure for the terminal.
    pub fn to_diagnostic(&self) -> Diagnostic {
        if self.is_cancelled() {
            return Diagnostic::error("cancelled");
        }

        let stage = self
            .stage()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "pipeline".to_string());
        let mut diag = Diagnostic::error(format!("{} stage failed: {}", stage, self));

        if let PipelineError::Resolve(e) = self {
            for line in e.context_lines() {
                diag = diag.with_context(line);
            }
        }

        if let Some(output) = self.tool_output() {
            diag = diag.with_tool_output(output.tail(OUTPUT_TAIL_LINES));
        }

        diag
    }
}

/// What a pipeline run should do.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    /// Raw `key=value` option overrides from the CLI.
    pub option_overrides: Vec<String>,

    /// Force the test stage on (`--test`).
    pub run_tests: bool,

    /// Build configuration.
    pub build_type: BuildType,

    /// When set, run the packaging stage into this directory.
    pub package_out: Option<PathBuf>,

    /// Stop after resolution and emit the plan instead of building.
    pub plan_only: bool,

    /// Verbose executor output.
    pub verbose: bool,
}

/// What a pipeline run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub plan: BuildPlan,
    pub exec: Option<ExecReport>,
    pub tests: Option<TestReport>,
    pub package: Option<PackageReport>,
}

/// Run the pipeline for a descriptor.
pub fn run(
    ctx: &GlobalContext,
    descriptor: &Descriptor,
    request: &BuildRequest,
    token: &CancelToken,
) -> Result<PipelineReport, PipelineError> {
    // Configuration-level validation happens before anything touches disk.
    let mut options = descriptor.options.apply_overrides(&request.option_overrides)?;
    if request.run_tests {
        options.build_tests = true;
    }

    check_token(token)?;

    let platform = Platform::host(request.build_type);

    // Resolve.
    tracing::info!("resolving dependencies of {}", descriptor.name);
    let cache = DepCache::new(ctx.cache_dir());
    let sources: Vec<Box<dyn Source>> = descriptor
        .sources
        .iter()
        .map(|dir| Box::new(DirSource::new(dir.clone())) as Box<dyn Source>)
        .collect();
    let deps = Resolver::new(sources, &cache).resolve(&descriptor.requires)?;

    let plan = BuildPlan::new(deps, options, platform);

    if request.plan_only {
        return Ok(PipelineReport {
            plan,
            exec: None,
            tests: None,
            package: None,
        });
    }

    check_token(token)?;

    // Configure + build.
    let tool = find_build_tool(ctx.env().cmake.as_deref())
        .ok_or_else(|| BuildError::Other(anyhow!("cmake not found in PATH")))?;
    let build_dir = descriptor
        .root
        .join(".stevedore")
        .join("build")
        .join(request.build_type.as_tool_config());
    crate::util::fs::ensure_dir(&build_dir).map_err(BuildError::Other)?;

    // Stage dependency runtime artifacts into the build tree so executables
    // built (and run by the test stage) can load them.
    let imports = ArtifactSet::runtime_imports();
    for dep in &plan.deps {
        packager::package(&imports, &dep.install_path, &build_dir).map_err(|e| {
            BuildError::Other(anyhow::Error::new(e).context(format!(
                "failed to import runtime artifacts of `{}`",
                dep.requirement
            )))
        })?;
    }

    let configure = configure_command(&tool, &descriptor.root, &build_dir, &plan);
    let compile = build_command(&tool, &build_dir, &plan);
    let exec = Executor::new()
        .verbose(request.verbose)
        .run(configure, compile, token)?;

    // Test, only when enabled.
    let tests = if plan.options.build_tests {
        let test_tool = find_test_tool(ctx.env().ctest.as_deref())
            .ok_or_else(|| TestError::Other(anyhow!("ctest not found in PATH")))?;
        Some(run_tests(
            &test_tool,
            &build_dir,
            plan.platform.build_type,
            token,
        )?)
    } else {
        None
    };

    // Package, only after everything above succeeded.
    let package = match &request.package_out {
        Some(out) => {
            check_token(token)?;
            tracing::info!("packaging into {}", out.display());
            let set = ArtifactSet::default_layout().with_extra_rules(&descriptor.copy_rules);
            Some(packager::package(&set, &build_dir, out)?)
        }
        None => None,
    };

    Ok(PipelineReport {
        plan,
        exec: Some(exec),
        tests,
        package,
    })
}

fn check_token(token: &CancelToken) -> Result<(), PipelineError> {
    token
        .check()
        .map_err(|_| PipelineError::Build(BuildError::Cancelled))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(code: Option<i32>) -> StepOutput {
        StepOutput {
            code,
            stdout: String::new(),
            stderr: "ld: cannot find -lmissing\n".to_string(),
        }
    }

    #[test]
    fn test_exit_codes_per_stage() {
        let resolve = PipelineError::Resolve(ResolveError::NotFound {
            reference: "x/1@_/stable".to_string(),
            searched: vec![],
        });
        assert_eq!(resolve.exit_code(), 1);
        assert_eq!(resolve.stage(), Some(Stage::Resolve));

        let configure = PipelineError::Build(BuildError::Configure {
            output: output(Some(1)),
        });
        assert_eq!(configure.exit_code(), 2);
        assert_eq!(configure.stage(), Some(Stage::Configure));

        let compile = PipelineError::Build(BuildError::Compile {
            output: output(Some(2)),
        });
        assert_eq!(compile.exit_code(), 2);
        assert_eq!(compile.stage(), Some(Stage::Build));

        let test = PipelineError::Test(TestError::Failed {
            output: output(Some(8)),
            cases: vec![],
        });
        assert_eq!(test.exit_code(), 3);

        let package = PipelineError::Package(PackageError::Collision {
            dest: PathBuf::from("lib/a.a"),
            first: PathBuf::from("x/a.a"),
            second: PathBuf::from("y/a.a"),
        });
        assert_eq!(package.exit_code(), 4);

        let option = PipelineError::Option(OptionError::Unrecognized {
            name: "lto".to_string(),
        });
        assert_eq!(option.exit_code(), 2);
        assert_eq!(option.stage(), Some(Stage::Configure));
    }

    #[test]
    fn test_cancellation_exit_code() {
        let cancelled = PipelineError::Build(BuildError::Cancelled);
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.exit_code(), EXIT_CANCELLED);
        assert_eq!(cancelled.stage(), None);
    }

    #[test]
    fn test_diagnostic_includes_stage_and_tail() {
        let err = PipelineError::Build(BuildError::Compile {
            output: output(Some(2)),
        });

        let shown = err.to_diagnostic().format(false);
        assert!(shown.contains("build stage failed"));
        assert!(shown.contains("ld: cannot find -lmissing"));
    }
}
