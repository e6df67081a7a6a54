//! Resolution error types.

use thiserror::Error;

/// Error during dependency resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Two requirements share a name but differ in version, user, or channel.
    #[error("conflicting requirements for `{name}`: `{first}` vs `{second}`")]
    Conflict {
        name: String,
        first: String,
        second: String,
    },

    /// No configured source carries the reference.
    #[error("requirement not found: `{reference}`")]
    NotFound {
        reference: String,
        searched: Vec<String>,
    },

    /// A source lookup or cache install failed.
    #[error("failed to resolve `{reference}`")]
    Source {
        reference: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ResolveError {
    /// Extra context lines for the CLI diagnostic.
    pub fn context_lines(&self) -> Vec<String> {
        match self {
            ResolveError::Conflict { name, .. } => {
                vec![format!(
                    "declare a single version and channel for `{}`",
                    name
                )]
            }
            ResolveError::NotFound { searched, .. } => {
                if searched.is_empty() {
                    vec!["no package sources are configured".to_string()]
                } else {
                    searched
                        .iter()
                        .map(|s| format!("searched: {}", s))
                        .collect()
                }
            }
            ResolveError::Source { source, .. } => vec![format!("{:#}", source)],
        }
    }
}
