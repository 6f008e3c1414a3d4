//! Error types for branchflow

use thiserror::Error;

/// Errors produced by branchflow
#[derive(Error, Debug)]
pub enum Error {
    /// The user declined a prompt or dismissed a selection
    #[error("cancelled")]
    Cancelled,

    /// Another merge workflow is already running in this process
    #[error("a merge workflow is already in progress; wait for it to finish and retry")]
    WorkflowInProgress,

    /// Working directory is not inside a git repository
    #[error("not a git repository: {0}")]
    NotARepository(String),

    /// HEAD is detached, so there is no current branch
    #[error("not on a branch (HEAD is detached)")]
    NotOnBranch,

    /// Current branch does not carry a configured feature prefix
    #[error("'{branch}' is not a feature branch; accepted prefixes: {accepted}")]
    NotFeatureBranch {
        /// Branch the workflow was started on
        branch: String,
        /// Comma-separated list of configured prefixes
        accepted: String,
    },

    /// No merge targets are configured
    #[error("no target branches are configured")]
    NoTargetBranches,

    /// Any other precondition that blocks a workflow before it mutates the repository
    #[error("{0}")]
    Precondition(String),

    /// Merge conflicts were not resolved (aborted or timed out)
    #[error("merge into '{target}' was not completed: {reason}")]
    ConflictUnresolved {
        /// Target branch that was being merged into
        target: String,
        /// Why the conflict flow ended
        reason: String,
    },

    /// A git command exited unsuccessfully or could not be spawned
    #[error("git {command} failed: {message}")]
    Vcs {
        /// Arguments passed to git, space-joined
        command: String,
        /// Captured stderr (or stdout / exit status when stderr is empty)
        message: String,
    },

    /// A branch write operation failed
    #[error("{0}")]
    Branch(String),

    /// Switching back to the original branch failed after the workflow ended
    #[error("could not switch back to '{branch}': {reason}. Please check out '{branch}' manually")]
    RestoreFailed {
        /// Branch the user started on
        branch: String,
        /// Workflow error (if any) and the checkout failure
        reason: String,
    },

    /// Configuration could not be read, written, or is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// The prompt backend failed (terminal unavailable etc.)
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a user cancellation rather than a failure
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias for branchflow operations
pub type Result<T> = std::result::Result<T, Error>;
