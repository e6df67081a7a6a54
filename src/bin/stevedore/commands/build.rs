//! `stevedore build` - resolve and build the current package.

use std::path::PathBuf;

use anyhow::Result;

use stevedore::core::platform::BuildType;
use stevedore::ops::{self, BuildRequest};
use stevedore::util::{CancelToken, GlobalContext};

use crate::cli::BuildArgs;
use crate::commands::load_descriptor;

pub fn execute(
    args: BuildArgs,
    manifest_path: Option<&PathBuf>,
    ctx: &GlobalContext,
    token: &CancelToken,
) -> Result<()> {
    let descriptor = load_descriptor(ctx, manifest_path)?;

    let request = BuildRequest {
        option_overrides: args.options,
        run_tests: args.test,
        build_type: if args.release {
            BuildType::Release
        } else {
            BuildType::Debug
        },
        package_out: None,
        plan_only: args.plan,
        verbose: ctx.is_verbose(),
    };

    let report = ops::run(ctx, &descriptor, &request, token)?;

    if args.plan {
        println!("{}", report.plan.to_json()?);
        return Ok(());
    }

    if let Some(tests) = &report.tests {
        let passed = tests.cases.iter().filter(|c| c.passed).count();
        if tests.cases.is_empty() {
            eprintln!("      Tested {} (suite passed)", descriptor.name);
        } else {
            eprintln!("      Tested {} ({} passed)", descriptor.name, passed);
        }
    }

    eprintln!(
        "    Finished {} v{} [{}]",
        descriptor.name, descriptor.version, request.build_type
    );
    Ok(())
}
