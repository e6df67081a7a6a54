//! Stevedore CLI - a dependency-aware build and package orchestrator

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stevedore::ops::PipelineError;
use stevedore::util::diagnostic;
use stevedore::util::{CancelToken, GlobalContext};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("stevedore=debug")
    } else {
        EnvFilter::new("stevedore=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(cli) {
        if let Some(pipeline_err) = e.downcast_ref::<PipelineError>() {
            diagnostic::emit(&pipeline_err.to_diagnostic(), color);
            std::process::exit(pipeline_err.exit_code());
        }
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);

    let token = CancelToken::new();
    let interrupt = token.clone();
    ctrlc::set_handler(move || interrupt.cancel())
        .context("failed to install interrupt handler")?;

    let manifest_path = cli.manifest_path.as_ref();

    match cli.command {
        Commands::Build(args) => commands::build::execute(args, manifest_path, &ctx, &token),
        Commands::Package(args) => commands::package::execute(args, manifest_path, &ctx, &token),
    }
}
