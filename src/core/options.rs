//! Recognized build options.
//!
//! The option set is a closed enumeration: `shared` and `build_tests`, both
//! booleans, both defaulting to false. Defaults come from the package
//! descriptor; the CLI overrides them with `--option key=value`. Anything
//! else is rejected before the pipeline touches the filesystem.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Names of the recognized options, for error messages.
pub const RECOGNIZED_OPTIONS: &[&str] = &["shared", "build_tests"];

/// Error validating a raw option flag.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("unrecognized option `{name}` (recognized: {})", RECOGNIZED_OPTIONS.join(", "))]
    Unrecognized { name: String },

    #[error("invalid value `{value}` for option `{name}`: expected true or false")]
    InvalidValue { name: String, value: String },

    #[error("malformed option `{raw}`: expected key=value")]
    Malformed { raw: String },
}

/// Validated build options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOptions {
    /// Build shared libraries instead of static ones.
    pub shared: bool,

    /// Build and run the package test suite.
    pub build_tests: bool,
}

impl BuildOptions {
    /// Apply raw `key=value` override flags on top of these defaults.
    pub fn apply_overrides(mut self, raw: &[String]) -> Result<Self, OptionError> {
        for flag in raw {
            let (name, value) = flag.split_once('=').ok_or_else(|| OptionError::Malformed {
                raw: flag.clone(),
            })?;

            let parsed = parse_bool(value).ok_or_else(|| OptionError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
            });

            match name {
                "shared" => self.shared = parsed?,
                "build_tests" => self.build_tests = parsed?,
                _ => {
                    return Err(OptionError::Unrecognized {
                        name: name.to_string(),
                    })
                }
            }
        }
        Ok(self)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
