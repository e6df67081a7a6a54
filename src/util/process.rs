//! Subprocess execution utilities.
//!
//! Every external tool call goes through [`ProcessBuilder`]: a typed command
//! (program, args, cwd) returning a structured [`StepOutput`], never a
//! shell string formatted ad hoc.

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::util::cancel::{CancelToken, Cancelled};

/// How often a running child is polled for exit or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a single external tool step.
#[derive(Debug, Clone)]
pub struct StepOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    /// Captured stdout, lossily decoded.
    pub stdout: String,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
}

impl StepOutput {
    /// Whether the step exited zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// The last `n` lines of tool output, preferring stderr when non-empty.
    ///
    /// Used for failure reporting; the full output stays attached to the
    /// error for anyone who wants it.
    pub fn tail(&self, n: usize) -> String {
        let text = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let lines: Vec<&str> = text.lines().collect();
        let start = lines.len().saturating_sub(n);
        lines[start..].join("\n")
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command, capturing output, honoring cancellation.
    ///
    /// The child is polled while it runs; if the token trips, the child is
    /// killed, reaped, and [`Cancelled`] is returned.
    pub fn exec_captured(&self, token: &CancelToken) -> Result<StepOutput> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        let stdout_reader = spawn_stdout_reader(child.stdout.take());
        let stderr_reader = spawn_stderr_reader(child.stderr.take());

        let status = loop {
            if token.is_cancelled() {
                // The child may have exited on its own already.
                let _ = child.kill();
                let _ = child.wait();
                let _ = stdout_reader.join();
                let _ = stderr_reader.join();
                return Err(Cancelled.into());
            }

            match self.try_wait(&mut child)? {
                Some(status) => break status,
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        Ok(StepOutput {
            code: status.code(),
            stdout,
            stderr,
        })
    }

    fn try_wait(&self, child: &mut Child) -> Result<Option<std::process::ExitStatus>> {
        child
            .try_wait()
            .with_context(|| format!("failed to wait for `{}`", self.program.display()))
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

fn spawn_stdout_reader(stdout: Option<ChildStdout>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = stdout {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

fn spawn_stderr_reader(stderr: Option<ChildStderr>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = stderr {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find the configure/build tool (cmake), honoring an explicit override.
pub fn find_build_tool(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.to_path_buf());
    }
    find_executable("cmake")
}

/// Find the test tool (ctest), honoring an explicit override.
pub fn find_test_tool(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.to_path_buf());
    }
    find_executable("ctest")
}
