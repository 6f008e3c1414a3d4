//! Conflict mediation after a failed merge
//!
//! The user can open the first conflicted file (the workflow stops there),
//! abort, or resolve by hand and let us poll. Polling is bounded by
//! [`MAX_CONFLICT_POLLS`]; it is the only retry loop in the crate.

use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::repo::{BranchLifecycle, Inspector};
use tracing::{info, warn};

/// Conflict checks allowed before the merge is abandoned
pub const MAX_CONFLICT_POLLS: u32 = 10;

/// How the conflict sub-flow ended without failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConflictResolution {
    /// Conflicts are gone and the merge is committed
    Resolved,
    /// The first conflicted file was opened; the user takes over from here
    OpenedFile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConflictChoice {
    OpenFirst,
    Abort,
    ResolveManually,
}

impl ConflictChoice {
    const fn label(self) -> &'static str {
        match self {
            Self::OpenFirst => "Open the first conflicted file",
            Self::Abort => "Abort the merge",
            Self::ResolveManually => "Resolve manually, then continue",
        }
    }
}

/// Conflict sub-flow for one merge of `source` into `target`
pub(crate) struct ConflictMediator<'a> {
    pub prompter: &'a dyn Prompter,
    pub inspector: &'a Inspector,
    pub lifecycle: &'a BranchLifecycle,
    pub source: &'a str,
    pub target: &'a str,
}

impl ConflictMediator<'_> {
    fn unresolved(&self, reason: impl Into<String>) -> Error {
        Error::ConflictUnresolved {
            target: self.target.to_string(),
            reason: reason.into(),
        }
    }

    /// Abort the merge, then produce the failure to return
    async fn abort(&self, reason: &str) -> Error {
        if let Err(e) = self.lifecycle.abort_merge().await {
            warn!(error = %e, "failed to abort merge");
        }
        self.unresolved(reason)
    }

    /// Present the conflicted files and act on the user's choice
    pub async fn run(&self, files: &[String]) -> Result<ConflictResolution> {
        let mut choices = Vec::with_capacity(3);
        if !files.is_empty() {
            choices.push(ConflictChoice::OpenFirst);
        }
        choices.push(ConflictChoice::Abort);
        choices.push(ConflictChoice::ResolveManually);
        let labels: Vec<&str> = choices.iter().map(|c| c.label()).collect();

        let message = if files.is_empty() {
            format!(
                "Merging '{}' into '{}' produced conflicts.",
                self.source, self.target
            )
        } else {
            format!(
                "Merging '{}' into '{}' produced conflicts in {} file(s):\n  {}",
                self.source,
                self.target,
                files.len(),
                files.join("\n  ")
            )
        };

        let choice = self
            .prompter
            .confirm(&message, &labels)
            .await?
            .and_then(|i| choices.get(i).copied());

        match choice {
            Some(ConflictChoice::OpenFirst) => {
                // Only offered when `files` is non-empty
                let first = files[0].clone();
                self.prompter.open_file(&first).await?;
                Ok(ConflictResolution::OpenedFile(first))
            }
            Some(ConflictChoice::ResolveManually) => self.poll_until_resolved().await,
            Some(ConflictChoice::Abort) | None => Err(self.abort("merge aborted by user").await),
        }
    }

    /// Re-check conflict state until clear, the user gives up, or attempts run out
    async fn poll_until_resolved(&self) -> Result<ConflictResolution> {
        for attempt in 1..=MAX_CONFLICT_POLLS {
            if !self.inspector.has_merge_conflicts().await? {
                info!(attempt, "conflicts cleared");
                return self.conclude().await;
            }
            // No prompt after the last check; falling out of the loop aborts
            if attempt == MAX_CONFLICT_POLLS {
                break;
            }

            let remaining = self.inspector.conflicted_files().await;
            let message = format!(
                "Conflicts remain in {} file(s): {} (check {attempt}/{MAX_CONFLICT_POLLS})",
                remaining.len(),
                remaining.join(", ")
            );
            let keep_waiting = self
                .prompter
                .confirm(&message, &["I've resolved them, check again", "Abort the merge"])
                .await?;
            if keep_waiting != Some(0) {
                return Err(self.abort("merge aborted by user").await);
            }
        }

        Err(self
            .abort(&format!(
                "conflicts still present after {MAX_CONFLICT_POLLS} checks"
            ))
            .await)
    }

    /// Commit the resolution if the user left it uncommitted
    async fn conclude(&self) -> Result<ConflictResolution> {
        // Clean tree means the user already committed the merge themselves
        if !self.inspector.has_uncommitted_changes().await? {
            return Ok(ConflictResolution::Resolved);
        }
        let choice = self
            .prompter
            .confirm(
                "All conflicts are resolved. Commit the resolution?",
                &["Commit the resolution", "Abort the merge"],
            )
            .await?;
        if choice != Some(0) {
            return Err(self.abort("resolution was not committed").await);
        }
        let message = format!(
            "Merge branch '{}' into {} (conflicts resolved)",
            self.source, self.target
        );
        self.lifecycle.commit(&message).await?;
        Ok(ConflictResolution::Resolved)
    }
}
