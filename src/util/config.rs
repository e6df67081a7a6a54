//! Global context for stevedore operations.
//!
//! Provides centralized access to paths and environment-derived defaults.
//! Environment variables are read exactly once, at context creation, into an
//! immutable [`EnvDefaults`]; nothing downstream consults `std::env` again.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Default publisher identity for bare references.
pub const DEFAULT_USER: &str = "_";

/// Default distribution channel for bare references.
pub const DEFAULT_CHANNEL: &str = "stable";

/// Environment variable overriding the default channel.
pub const ENV_CHANNEL: &str = "STEVEDORE_CHANNEL";

/// Environment variable overriding the default publisher identity.
pub const ENV_USER: &str = "STEVEDORE_USER";

/// Environment variable overriding the configure/build tool path.
pub const ENV_CMAKE: &str = "STEVEDORE_CMAKE";

/// Environment variable overriding the test tool path.
pub const ENV_CTEST: &str = "STEVEDORE_CTEST";

/// Project directories for stevedore
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("io", "stevedore", "stevedore"));

/// Environment-derived defaults, captured once at startup.
///
/// Used only while resolving named requirements (channel/user) and when
/// locating the external tools.
#[derive(Debug, Clone)]
pub struct EnvDefaults {
    /// Default channel for references that omit one.
    pub channel: String,

    /// Default publisher identity for references that omit one.
    pub user: String,

    /// Explicit path to the build tool, if overridden.
    pub cmake: Option<PathBuf>,

    /// Explicit path to the test tool, if overridden.
    pub ctest: Option<PathBuf>,
}

impl EnvDefaults {
    /// Capture defaults from the process environment.
    pub fn capture() -> Self {
        EnvDefaults {
            channel: std::env::var(ENV_CHANNEL).unwrap_or_else(|_| DEFAULT_CHANNEL.to_string()),
            user: std::env::var(ENV_USER).unwrap_or_else(|_| DEFAULT_USER.to_string()),
            cmake: std::env::var_os(ENV_CMAKE).map(PathBuf::from),
            ctest: std::env::var_os(ENV_CTEST).map(PathBuf::from),
        }
    }
}

impl Default for EnvDefaults {
    fn default() -> Self {
        EnvDefaults {
            channel: DEFAULT_CHANNEL.to_string(),
            user: DEFAULT_USER.to_string(),
            cmake: None,
            ctest: None,
        }
    }
}

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global stevedore data (~/.stevedore/)
    home: PathBuf,

    /// Captured environment defaults
    env: EnvDefaults,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd_and_env(cwd, EnvDefaults::capture()))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        Self::with_cwd_and_env(cwd, EnvDefaults::capture())
    }

    /// Create a GlobalContext with explicit environment defaults.
    ///
    /// Tests use this to avoid touching the real process environment.
    pub fn with_cwd_and_env(cwd: PathBuf, env: EnvDefaults) -> Self {
        let home = if let Some(dirs) = PROJECT_DIRS.as_ref() {
            dirs.cache_dir().to_path_buf()
        } else {
            // Fallback to ~/.stevedore
            std::env::var_os("HOME")
                .map(|h| PathBuf::from(h).join(".stevedore"))
                .unwrap_or_else(|| PathBuf::from(".stevedore"))
        };

        GlobalContext {
            cwd,
            home,
            env,
            verbose: false,
            color: true,
        }
    }

    /// Override the home directory (tests point this at a temp dir).
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the stevedore home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the captured environment defaults.
    pub fn env(&self) -> &EnvDefaults {
        &self.env
    }

    /// Get the global cache directory for fetched dependencies.
    pub fn cache_dir(&self) -> PathBuf {
        self.home.join("cache")
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }
}
