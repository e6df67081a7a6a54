//! Build execution: the configure and compile steps.
//!
//! Both steps are blocking external processes. Compile never starts before
//! configure is observed to exit zero, and the first non-zero exit halts the
//! pipeline with the step's captured output attached. Native compiler
//! failures are not transient, so there are no retries.

use std::time::{Duration, Instant};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tempfile::TempDir;
use thiserror::Error;

use crate::util::cancel::{CancelToken, Cancelled};
use crate::util::process::{ProcessBuilder, StepOutput};

/// Error from the configure or compile step.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("configure step failed")]
    Configure { output: StepOutput },

    #[error("compile step failed")]
    Compile { output: StepOutput },

    #[error("build cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BuildError {
    /// The captured tool output, when the step ran at all.
    pub fn step_output(&self) -> Option<&StepOutput> {
        match self {
            BuildError::Configure { output } | BuildError::Compile { output } => Some(output),
            _ => None,
        }
    }
}

/// Captured output of both executor steps.
#[derive(Debug)]
pub struct ExecReport {
    pub configure: StepOutput,
    pub compile: StepOutput,
}

/// Runs the configure and compile steps sequentially.
pub struct Executor {
    verbose: bool,
}

impl Executor {
    /// Create a new executor.
    pub fn new() -> Self {
        Executor { verbose: false }
    }

    /// Enable verbose output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run configure, then compile.
    ///
    /// Both steps get a scratch working directory that is removed on every
    /// exit path, success, failure, or cancellation alike.
    pub fn run(
        &self,
        configure: ProcessBuilder,
        compile: ProcessBuilder,
        token: &CancelToken,
    ) -> Result<ExecReport, BuildError> {
        token.check().map_err(|_| BuildError::Cancelled)?;

        // Dropped on all paths; cleanup is the guard's job.
        let scratch = TempDir::new().context("failed to create scratch directory")?;

        let configure_out = self.run_step("configuring", configure.cwd(scratch.path()), token)?;
        if !configure_out.success() {
            return Err(BuildError::Configure {
                output: configure_out,
            });
        }

        token.check().map_err(|_| BuildError::Cancelled)?;

        let compile_out = self.run_step("compiling", compile.cwd(scratch.path()), token)?;
        if !compile_out.success() {
            return Err(BuildError::Compile {
                output: compile_out,
            });
        }

        Ok(ExecReport {
            configure: configure_out,
            compile: compile_out,
        })
    }

    fn run_step(
        &self,
        label: &str,
        cmd: ProcessBuilder,
        token: &CancelToken,
    ) -> Result<StepOutput, BuildError> {
        tracing::info!("{}: {}", label, cmd.display_command());
        let start = Instant::now();

        let spinner = if self.verbose {
            None
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            pb.set_message(label.to_string());
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        };

        let result = cmd.exec_captured(token);

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let output = result.map_err(|e| {
            if e.downcast_ref::<Cancelled>().is_some() {
                BuildError::Cancelled
            } else {
                BuildError::Other(e)
            }
        })?;

        tracing::debug!(
            "{} finished in {:.2}s (exit {:?})",
            label,
            start.elapsed().as_secs_f64(),
            output.code
        );

        if self.verbose && !output.stdout.is_empty() {
            eprint!("{}", output.stdout);
        }

        Ok(output)
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn fake_tool(dir: &Path, name: &str, script: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_both_steps_run_in_order() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("log");
        let tool = fake_tool(
            tmp.path(),
            "tool",
            &format!("echo \"$1\" >> {}", log.display()),
        );

        let exec = Executor::new().verbose(true);
        let report = exec
            .run(
                ProcessBuilder::new(&tool).arg("configure"),
                ProcessBuilder::new(&tool).arg("compile"),
                &CancelToken::new(),
            )
            .unwrap();

        assert!(report.configure.success());
        assert!(report.compile.success());
        assert_eq!(
            std::fs::read_to_string(&log).unwrap(),
            "configure\ncompile\n"
        );
    }

    #[test]
    fn test_configure_failure_halts_before_compile() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("log");
        let fail = fake_tool(tmp.path(), "fail", "echo boom >&2; exit 3");
        let record = fake_tool(
            tmp.path(),
            "record",
            &format!("echo ran >> {}", log.display()),
        );

        let exec = Executor::new().verbose(true);
        let err = exec
            .run(
                ProcessBuilder::new(&fail),
                ProcessBuilder::new(&record),
                &CancelToken::new(),
            )
            .unwrap_err();

        match err {
            BuildError::Configure { output } => {
                assert_eq!(output.code, Some(3));
                assert!(output.stderr.contains("boom"));
            }
            other => panic!("expected Configure error, got {:?}", other),
        }
        assert!(!log.exists());
    }

    #[test]
    fn test_compile_failure_carries_output() {
        let tmp = TempDir::new().unwrap();
        let ok = fake_tool(tmp.path(), "ok", "exit 0");
        let fail = fake_tool(tmp.path(), "fail", "echo 'undefined reference' >&2; exit 1");

        let exec = Executor::new().verbose(true);
        let err = exec
            .run(
                ProcessBuilder::new(&ok),
                ProcessBuilder::new(&fail),
                &CancelToken::new(),
            )
            .unwrap_err();

        match err {
            BuildError::Compile { output } => {
                assert!(output.stderr.contains("undefined reference"));
            }
            other => panic!("expected Compile error, got {:?}", other),
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let tmp = TempDir::new().unwrap();
        let ok = fake_tool(tmp.path(), "ok", "exit 0");

        let token = CancelToken::new();
        token.cancel();

        let err = Executor::new()
            .verbose(true)
            .run(
                ProcessBuilder::new(&ok),
                ProcessBuilder::new(&ok),
                &token,
            )
            .unwrap_err();

        assert!(matches!(err, BuildError::Cancelled));
    }

    #[test]
    fn test_cancellation_mid_build_kills_process() {
        let tmp = TempDir::new().unwrap();
        let ok = fake_tool(tmp.path(), "ok", "exit 0");
        let slow = fake_tool(tmp.path(), "slow", "sleep 30");

        let token = CancelToken::new();
        let clone = token.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            clone.cancel();
        });

        let start = Instant::now();
        let err = Executor::new()
            .verbose(true)
            .run(ProcessBuilder::new(&ok), ProcessBuilder::new(&slow), &token)
            .unwrap_err();

        assert!(matches!(err, BuildError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
