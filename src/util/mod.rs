//! Shared utilities

pub mod cancel;
pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod process;

pub use cancel::{CancelToken, Cancelled};
pub use config::{EnvDefaults, GlobalContext};
pub use diagnostic::Diagnostic;
pub use process::{ProcessBuilder, StepOutput};
