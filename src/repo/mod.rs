//! Repository access built on a [`VcsExecutor`](crate::vcs::VcsExecutor)
//!
//! - [`Inspector`] answers read-only questions about the live repository.
//! - [`BranchLifecycle`] performs single-invocation write operations.
//!
//! Neither caches anything: the repository is the source of truth and is
//! re-queried on every call.

mod inspect;
mod lifecycle;

pub use inspect::Inspector;
pub use lifecycle::{BranchLifecycle, CheckoutKind, UpstreamAction};

/// Remote used when configuration does not name one
pub const DEFAULT_REMOTE: &str = "origin";
