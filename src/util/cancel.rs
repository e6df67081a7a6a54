//! Cooperative cancellation.
//!
//! A `CancelToken` is shared between the orchestrator and whoever wants to
//! interrupt it. Stages check the token between steps; the process executor
//! polls it while a child is running and kills the child when it trips.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Error raised when a pipeline run is cancelled externally.
///
/// Propagates through every remaining stage; no package output is written
/// after this is observed.
#[derive(Debug, Clone, Copy, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Shared cancellation flag.
///
/// Cheap to clone; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, untripped token.
    pub fn new() -> Self {
        CancelToken {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Trip the token. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Return `Err(Cancelled)` if the token has tripped.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
