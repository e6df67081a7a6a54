//! Dependency references - WHAT package a build requires.
//!
//! A requirement is written `name/version@user/channel`, e.g.
//! `Boost/1.60.0@lasote/stable`. The `@user/channel` suffix may be omitted,
//! in which case the captured environment defaults fill it in. Versions are
//! opaque strings compared for equality only; the flat resolution model has
//! no version ranges to solve.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::config::EnvDefaults;

/// Error parsing a requirement reference.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("invalid reference `{reference}`: expected `name/version[@user/channel]`")]
    Malformed { reference: String },

    #[error("invalid reference `{reference}`: invalid {part}")]
    InvalidPart {
        reference: String,
        part: &'static str,
    },
}

/// A declared dependency: name, version, publisher, and channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Requirement {
    /// Package name
    pub name: String,

    /// Exact version string (opaque, equality-compared)
    pub version: String,

    /// Publisher identity
    pub user: String,

    /// Distribution channel (e.g. "stable", "testing")
    pub channel: String,
}

impl Requirement {
    /// Create a requirement from its four parts.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        user: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Requirement {
            name: name.into(),
            version: version.into(),
            user: user.into(),
            channel: channel.into(),
        }
    }

    /// Parse a reference string, filling in missing user/channel from the
    /// captured environment defaults.
    pub fn parse(reference: &str, defaults: &EnvDefaults) -> Result<Self, ReferenceError> {
        let malformed = || ReferenceError::Malformed {
            reference: reference.to_string(),
        };

        let (body, suffix) = match reference.split_once('@') {
            Some((body, suffix)) => (body, Some(suffix)),
            None => (reference, None),
        };

        let (name, version) = body.split_once('/').ok_or_else(malformed)?;

        let (user, channel) = match suffix {
            Some(suffix) => {
                let (user, channel) = suffix.split_once('/').ok_or_else(malformed)?;
                (user.to_string(), channel.to_string())
            }
            None => (defaults.user.clone(), defaults.channel.clone()),
        };

        let req = Requirement::new(name, version, user, channel);
        req.validate(reference)?;
        Ok(req)
    }

    fn validate(&self, reference: &str) -> Result<(), ReferenceError> {
        // Parts become path components under the source and cache roots, so
        // anything path-like must be rejected, not just the separators.
        let check = |value: &str, part: &'static str| {
            let path_like = value == "." || value == "..";
            if value.is_empty()
                || path_like
                || value.contains('/')
                || value.contains('\\')
                || value.contains('@')
            {
                Err(ReferenceError::InvalidPart {
                    reference: reference.to_string(),
                    part,
                })
            } else {
                Ok(())
            }
        };
        check(&self.name, "name")?;
        check(&self.version, "version")?;
        check(&self.user, "user")?;
        check(&self.channel, "channel")?;
        Ok(())
    }

    /// The relative directory this requirement occupies inside a source or
    /// the cache: `name/version/user/channel`.
    pub fn dir_components(&self) -> PathBuf {
        PathBuf::from(&self.name)
            .join(&self.version)
            .join(&self.user)
            .join(&self.channel)
    }

    /// Key used for duplicate/conflict detection merge ordering.
    pub fn merge_key(&self) -> (&str, &str) {
        (&self.name, &self.channel)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}/{}",
            self.name, self.version, self.user, self.channel
        )
    }
}
