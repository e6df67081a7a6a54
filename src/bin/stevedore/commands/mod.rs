//! Command implementations.

pub mod build;
pub mod package;

use std::path::PathBuf;

use anyhow::{bail, Result};

use stevedore::core::descriptor::{Descriptor, DESCRIPTOR_NAME};
use stevedore::util::GlobalContext;

/// Locate and load the descriptor for this invocation.
pub fn load_descriptor(ctx: &GlobalContext, manifest_path: Option<&PathBuf>) -> Result<Descriptor> {
    let path = match manifest_path {
        Some(path) => path.clone(),
        None => match Descriptor::find(ctx.cwd()) {
            Some(path) => path,
            None => bail!(
                "could not find {} in {} or any parent directory",
                DESCRIPTOR_NAME,
                ctx.cwd().display()
            ),
        },
    };
    Descriptor::load(&path, ctx.env())
}
