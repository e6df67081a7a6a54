//! Dependency resolution.
//!
//! The model is flat: declared requirements are leaf binary packages, so the
//! install plan is declaration order with exact duplicates removed. What the
//! resolver adds is conflict detection, source lookup, and idempotent cache
//! installation. Lookups for independent requirements run in parallel;
//! conflict detection happens first on a deterministically sorted copy, so
//! resolution order never affects the outcome and a conflicting requirement
//! set installs nothing.

pub mod errors;

use rayon::prelude::*;

use crate::core::plan::ResolvedDependency;
use crate::core::requirement::Requirement;
use crate::sources::{DepCache, PackageMeta, Source};

pub use errors::ResolveError;

/// Resolves declared requirements against configured package sources.
pub struct Resolver<'a> {
    sources: Vec<Box<dyn Source>>,
    cache: &'a DepCache,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over the given sources (searched in order).
    pub fn new(sources: Vec<Box<dyn Source>>, cache: &'a DepCache) -> Self {
        Resolver { sources, cache }
    }

    /// Resolve requirements into an ordered, deduplicated dependency list.
    pub fn resolve(
        &self,
        requirements: &[Requirement],
    ) -> Result<Vec<ResolvedDependency>, ResolveError> {
        let unique = check_conflicts(requirements)?;

        tracing::debug!("resolving {} requirement(s)", unique.len());

        // Independent lookups; rayon keeps output in input order.
        unique
            .par_iter()
            .map(|req| self.resolve_one(req))
            .collect()
    }

    fn resolve_one(&self, req: &Requirement) -> Result<ResolvedDependency, ResolveError> {
        let mut searched = Vec::new();

        for source in &self.sources {
            let located = source.locate(req).map_err(|e| ResolveError::Source {
                reference: req.to_string(),
                source: e,
            })?;

            if let Some(package_dir) = located {
                tracing::debug!("located {} in {}", req, source.name());

                let install_path =
                    self.cache
                        .install(req, &package_dir)
                        .map_err(|e| ResolveError::Source {
                            reference: req.to_string(),
                            source: e,
                        })?;

                let meta =
                    PackageMeta::load(&install_path).map_err(|e| ResolveError::Source {
                        reference: req.to_string(),
                        source: e,
                    })?;

                return Ok(ResolvedDependency {
                    requirement: req.clone(),
                    install_path,
                    libs: meta.libs_or(&req.name),
                });
            }

            searched.push(source.name());
        }

        Err(ResolveError::NotFound {
            reference: req.to_string(),
            searched,
        })
    }
}

/// Detect same-name conflicts and drop exact duplicates.
///
/// Works on a copy sorted by `(name, channel)` so the check is independent
/// of declaration order; the returned list preserves declaration order of
/// first occurrences.
fn check_conflicts(requirements: &[Requirement]) -> Result<Vec<Requirement>, ResolveError> {
    let mut sorted: Vec<&Requirement> = requirements.iter().collect();
    sorted.sort_by(|a, b| a.merge_key().cmp(&b.merge_key()).then(a.cmp(b)));

    for pair in sorted.windows(2) {
        if pair[0].name == pair[1].name && pair[0] != pair[1] {
            return Err(ResolveError::Conflict {
                name: pair[0].name.clone(),
                first: pair[0].to_string(),
                second: pair[1].to_string(),
            });
        }
    }

    let mut unique = Vec::new();
    for req in requirements {
        if !unique.contains(req) {
            unique.push(req.clone());
        }
    }
    Ok(unique)
}
