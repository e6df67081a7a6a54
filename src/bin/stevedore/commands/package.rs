//! `stevedore package` - build and stage artifacts into a package layout.

use std::path::PathBuf;

use anyhow::Result;

use stevedore::core::platform::BuildType;
use stevedore::ops::{self, BuildRequest};
use stevedore::util::diagnostic::{emit, Diagnostic};
use stevedore::util::fs::dir_is_populated;
use stevedore::util::{CancelToken, GlobalContext};

use crate::cli::PackageArgs;
use crate::commands::load_descriptor;

pub fn execute(
    args: PackageArgs,
    manifest_path: Option<&PathBuf>,
    ctx: &GlobalContext,
    token: &CancelToken,
) -> Result<()> {
    let descriptor = load_descriptor(ctx, manifest_path)?;

    // Packaging is not atomic on failure; a fresh destination avoids
    // stale leftovers mixing with a partial run.
    if dir_is_populated(&args.out) {
        emit(
            &Diagnostic::warning(format!(
                "package destination {} is not empty",
                args.out.display()
            ))
            .with_context("packaging into a fresh directory is recommended"),
            ctx.color(),
        );
    }

    let request = BuildRequest {
        option_overrides: args.options,
        run_tests: args.test,
        build_type: if args.release {
            BuildType::Release
        } else {
            BuildType::Debug
        },
        package_out: Some(args.out.clone()),
        plan_only: false,
        verbose: ctx.is_verbose(),
    };

    let report = ops::run(ctx, &descriptor, &request, token)?;

    let staged = report.package.map(|p| p.file_count()).unwrap_or(0);
    eprintln!(
        "    Packaged {} v{} ({} file(s) in {})",
        descriptor.name,
        descriptor.version,
        staged,
        args.out.display()
    );
    Ok(())
}
