//! High-level operations.
//!
//! This module contains the pipeline behind the stevedore commands.

pub mod pipeline;

pub use pipeline::{
    run, BuildRequest, PipelineError, PipelineReport, Stage, EXIT_CANCELLED,
};
