//! Native build orchestration: configure, compile, and test steps.

pub mod configure;
pub mod executor;
pub mod testrunner;

pub use configure::{build_command, configure_command};
pub use executor::{BuildError, ExecReport, Executor};
pub use testrunner::{run_tests, TestCase, TestError, TestReport};
