//! Test-suite execution.
//!
//! Runs only when the `build_tests` option is on. Pass/fail comes from the
//! test tool's exit code; a per-test breakdown is parsed from its output
//! when the lines are recognizable, and ignored when they are not.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::core::platform::BuildType;
use crate::util::cancel::{CancelToken, Cancelled};
use crate::util::process::{ProcessBuilder, StepOutput};

/// Matches ctest result lines like
/// `1/2 Test #1: graph_smoke ..............   Passed    0.01 sec`
/// `2/2 Test #2: chart_events .............***Failed    0.02 sec`
static TEST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Test\s+#\d+:\s+(\S+)\s+\.*\s*\**\s*(Passed|Failed|Timeout|Not Run)")
        .expect("test line pattern is valid")
});

/// Error from the test stage.
#[derive(Debug, Error)]
pub enum TestError {
    #[error("test suite failed")]
    Failed {
        output: StepOutput,
        cases: Vec<TestCase>,
    },

    #[error("tests cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TestError {
    /// The captured tool output, when the suite ran at all.
    pub fn step_output(&self) -> Option<&StepOutput> {
        match self {
            TestError::Failed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// One test case parsed from the tool's report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub passed: bool,
}

/// Result of a passing test run.
#[derive(Debug)]
pub struct TestReport {
    /// Per-test breakdown; empty when the tool's output was not parseable.
    pub cases: Vec<TestCase>,
    pub output: StepOutput,
}

/// Run the test suite in the build directory.
pub fn run_tests(
    tool: &Path,
    build_dir: &Path,
    build_type: BuildType,
    token: &CancelToken,
) -> Result<TestReport, TestError> {
    token.check().map_err(|_| TestError::Cancelled)?;

    let cmd = ProcessBuilder::new(tool)
        .arg("-C")
        .arg(build_type.as_tool_config())
        .arg("--output-on-failure")
        .cwd(build_dir);

    tracing::info!("testing: {}", cmd.display_command());

    let output = cmd.exec_captured(token).map_err(|e| {
        if e.downcast_ref::<Cancelled>().is_some() {
            TestError::Cancelled
        } else {
            TestError::Other(e)
        }
    })?;

    let cases = parse_cases(&output.stdout);
    for case in &cases {
        tracing::debug!(
            "test {}: {}",
            case.name,
            if case.passed { "passed" } else { "FAILED" }
        );
    }

    if output.success() {
        Ok(TestReport { cases, output })
    } else {
        Err(TestError::Failed { output, cases })
    }
}

/// Best-effort parse of the tool's per-test result lines.
fn parse_cases(stdout: &str) -> Vec<TestCase> {
    TEST_LINE
        .captures_iter(stdout)
        .map(|caps| TestCase {
            name: caps[1].to_string(),
            passed: &caps[2] == "Passed",
        })
        .collect()
}
