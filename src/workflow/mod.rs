//! Multi-step workflows over the repository
//!
//! - [`BranchCreator`]: pick prefix and base, compose a conventional name, create.
//! - [`MergeOrchestrator`]: merge the current feature branch into a configured
//!   target, mediate conflicts, push, and always return to the starting branch.

mod conflict;
mod create;
mod guard;
mod merge;

pub use conflict::MAX_CONFLICT_POLLS;
pub use create::{BranchCreator, CreateOutcome};
pub use guard::{FlightGuard, SingleFlight};
pub use merge::{MergeOrchestrator, MergeOutcome, MergePhase, MergeSession};

use crate::config::Settings;
use crate::repo::{BranchLifecycle, Inspector};
use crate::vcs::VcsExecutor;
use async_trait::async_trait;
use std::sync::Arc;

/// Progress callback for workflow status messages
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called with a human-readable status line
    async fn on_message(&self, message: &str);
}

/// Progress sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}
}

/// Fresh inspector and lifecycle manager for the configured remote
fn repository(vcs: &Arc<dyn VcsExecutor>, settings: &Settings) -> (Inspector, BranchLifecycle) {
    let inspector = Inspector::new(Arc::clone(vcs), settings.remote.clone());
    (inspector.clone(), BranchLifecycle::new(inspector))
}
