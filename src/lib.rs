//! Stevedore - a dependency-aware build and package orchestrator for
//! native libraries.
//!
//! This crate provides the core library functionality for stevedore:
//! dependency resolution, native build configuration and execution, test
//! running, and artifact packaging.

pub mod builder;
pub mod core;
pub mod ops;
pub mod packager;
pub mod resolver;
pub mod sources;
pub mod util;

pub use self::core::{
    BuildOptions, BuildPlan, BuildType, Descriptor, Platform, Requirement, ResolvedDependency,
};

pub use ops::{BuildRequest, PipelineError, PipelineReport};
pub use util::{CancelToken, GlobalContext};
