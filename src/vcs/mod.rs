//! Version-control command execution
//!
//! Everything above this layer talks to git through [`VcsExecutor`], so the
//! inspector, lifecycle manager and workflows can run against a fake in tests.

mod git;

pub use git::GitCli;

use crate::error::Result;
use async_trait::async_trait;

/// Runs version-control commands against one working directory
#[async_trait]
pub trait VcsExecutor: Send + Sync {
    /// Run a command with the given arguments
    ///
    /// Returns trimmed stdout on success. A non-zero exit or a failure to
    /// launch the binary yields [`Error::Vcs`](crate::error::Error::Vcs).
    async fn run(&self, args: &[&str]) -> Result<String>;
}
