//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Stevedore - a dependency-aware build and package orchestrator
#[derive(Parser)]
#[command(name = "stevedore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to Stevedore.toml (defaults to searching upward from cwd)
    #[arg(long, global = true)]
    pub manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve dependencies and build the package
    Build(BuildArgs),

    /// Build, then stage artifacts into a package directory
    Package(PackageArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Override a recognized option, e.g. --option shared=true
    #[arg(long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Build and run the test suite
    #[arg(long)]
    pub test: bool,

    /// Build in release mode
    #[arg(short, long)]
    pub release: bool,

    /// Emit the resolved build plan as JSON (no build)
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct PackageArgs {
    /// Directory to stage the package layout into
    #[arg(long)]
    pub out: PathBuf,

    /// Override a recognized option, e.g. --option shared=true
    #[arg(long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Build and run the test suite before packaging
    #[arg(long)]
    pub test: bool,

    /// Build in release mode
    #[arg(short, long)]
    pub release: bool,
}
