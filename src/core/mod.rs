//! Core data structures for stevedore.
//!
//! This module contains the foundational types used throughout the
//! orchestrator: requirement references, the package descriptor, the
//! recognized option set, platform descriptors, and the build plan.

pub mod descriptor;
pub mod options;
pub mod plan;
pub mod platform;
pub mod requirement;

pub use descriptor::{Descriptor, DESCRIPTOR_NAME};
pub use options::{BuildOptions, OptionError};
pub use plan::{BuildPlan, ResolvedDependency};
pub use platform::{BuildType, Platform};
pub use requirement::{ReferenceError, Requirement};
