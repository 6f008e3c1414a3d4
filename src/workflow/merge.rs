//! Feature-to-target merge workflow
//!
//! Phases, in order:
//!
//! ```text
//! Idle -> PreparingEnvironment -> SelectingTarget -> Merging [-> ConflictPending]
//!      -> Pushing -> RestoringOriginalBranch -> Completed | Failed
//! ```
//!
//! Nothing is mutated before `Merging` except pushing or committing the
//! source branch itself, so failures up to that point need no rollback. From
//! `Merging` on, every exit path switches back to the branch the user started
//! on. The only exception is "open the first conflicted file": git will not
//! switch branches with unmerged paths, so the user is left on the target.

use crate::config::SettingsSource;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::repo::{BranchLifecycle, Inspector};
use crate::vcs::VcsExecutor;
use crate::workflow::conflict::{ConflictMediator, ConflictResolution};
use crate::workflow::guard::SingleFlight;
use crate::workflow::{ProgressCallback, repository};
use std::sync::Arc;
use tracing::{info, warn};

/// Where a merge session currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePhase {
    /// Not started
    Idle,
    /// Checking the repository and the source branch
    PreparingEnvironment,
    /// Waiting for the user to pick a target
    SelectingTarget,
    /// Checking out, updating and merging into the target
    Merging,
    /// Merge stopped on conflicts; user is deciding
    ConflictPending,
    /// Pushing the merged target
    Pushing,
    /// Switching back to the original branch
    RestoringOriginalBranch,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

/// State of one merge invocation; dropped when the invocation returns
#[derive(Debug, Clone)]
pub struct MergeSession {
    /// Branch the user started on
    pub original_branch: Option<String>,
    /// Selected target
    pub target_branch: Option<String>,
    /// Current phase
    pub phase: MergePhase,
    /// Files reported as conflicted, if the merge stopped on conflicts
    pub conflict_files: Vec<String>,
}

impl MergeSession {
    const fn new() -> Self {
        Self {
            original_branch: None,
            target_branch: None,
            phase: MergePhase::Idle,
            conflict_files: Vec::new(),
        }
    }

    fn advance(&mut self, phase: MergePhase) {
        info!(from = ?self.phase, to = ?phase, "merge phase");
        self.phase = phase;
    }

    /// Whether the working tree may have left the original branch
    const fn needs_restore(&self) -> bool {
        matches!(
            self.phase,
            MergePhase::Merging | MergePhase::ConflictPending | MergePhase::Pushing
        )
    }
}

/// How a merge invocation ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Target merged and pushed; back on the source branch
    Completed {
        /// Feature branch that was merged
        source: String,
        /// Target it was merged into
        target: String,
    },
    /// User dismissed a prompt before anything changed
    Cancelled,
    /// User chose to edit a conflicted file; still on the target, merge in progress
    AwaitingResolution {
        /// Feature branch being merged
        source: String,
        /// Target branch currently checked out
        target: String,
        /// File that was opened
        file: String,
    },
}

enum MergeStage {
    Pushed,
    OpenedFile(String),
}

/// Runs merge workflows, one at a time
///
/// Each orchestrator owns its own [`SingleFlight`] unless given a shared one
/// through [`MergeOrchestrator::with_flight`]; orchestrators that should
/// exclude each other must share it. The CLI builds exactly one per process.
pub struct MergeOrchestrator {
    vcs: Arc<dyn VcsExecutor>,
    prompter: Arc<dyn Prompter>,
    settings: Arc<dyn SettingsSource>,
    progress: Arc<dyn ProgressCallback>,
    flight: SingleFlight,
}

impl MergeOrchestrator {
    /// Create an orchestrator
    pub fn new(
        vcs: Arc<dyn VcsExecutor>,
        prompter: Arc<dyn Prompter>,
        settings: Arc<dyn SettingsSource>,
        progress: Arc<dyn ProgressCallback>,
    ) -> Self {
        Self {
            vcs,
            prompter,
            settings,
            progress,
            flight: SingleFlight::new(),
        }
    }

    /// Share `flight` with other orchestrators so at most one of them merges at a time
    #[must_use]
    pub fn with_flight(mut self, flight: SingleFlight) -> Self {
        self.flight = flight;
        self
    }

    /// Whether a merge workflow is running right now
    pub fn is_busy(&self) -> bool {
        self.flight.is_busy()
    }

    /// Merge the current feature branch into a user-selected target
    ///
    /// Rejected immediately with [`Error::WorkflowInProgress`] if another
    /// merge holds this orchestrator's flight.
    pub async fn merge_into_target(&self) -> Result<MergeOutcome> {
        let Some(_flight) = self.flight.try_acquire() else {
            warn!("merge requested while another merge is running");
            return Err(Error::WorkflowInProgress);
        };

        let mut session = MergeSession::new();
        let result = self.run(&mut session).await;

        match &result {
            Ok(MergeOutcome::Completed { .. }) => session.advance(MergePhase::Completed),
            Ok(_) | Err(Error::Cancelled) => {}
            Err(_) => session.advance(MergePhase::Failed),
        }

        match result {
            Err(Error::Cancelled) => Ok(MergeOutcome::Cancelled),
            other => other,
        }
    }

    async fn run(&self, session: &mut MergeSession) -> Result<MergeOutcome> {
        session.advance(MergePhase::PreparingEnvironment);
        let settings = self.settings.load()?;
        let (inspector, lifecycle) = repository(&self.vcs, &settings);
        let source = self.prepare(&inspector, &lifecycle).await?;
        session.original_branch = Some(source.clone());

        session.advance(MergePhase::SelectingTarget);
        let target = self.select_target().await?;
        session.target_branch = Some(target.clone());

        self.progress
            .on_message(&format!(
                "Merging {source} into {target}. Avoid touching the repository until this finishes."
            ))
            .await;

        // From here on every failure has to bring the user back to `source`
        session.advance(MergePhase::Merging);
        let stage = self
            .merge_and_push(session, &inspector, &lifecycle, &source, &target)
            .await;

        match stage {
            Ok(MergeStage::OpenedFile(file)) => {
                self.progress
                    .on_message(&format!(
                        "Resolve the conflicts on {target}, commit, then run the merge again."
                    ))
                    .await;
                Ok(MergeOutcome::AwaitingResolution {
                    source,
                    target,
                    file,
                })
            }
            Ok(MergeStage::Pushed) => {
                session.advance(MergePhase::RestoringOriginalBranch);
                self.restore(&lifecycle, &source)
                    .await
                    .map_err(|e| Error::RestoreFailed {
                        branch: source.clone(),
                        reason: e.to_string(),
                    })?;
                self.progress
                    .on_message(&format!("Merged {source} into {target} and pushed."))
                    .await;
                Ok(MergeOutcome::Completed { source, target })
            }
            Err(error) => {
                // A conflicting pull or a failed resolution commit leaves the
                // target mid-merge, and git refuses to switch branches from there
                if matches!(session.phase, MergePhase::Merging | MergePhase::ConflictPending)
                    && !matches!(error, Error::ConflictUnresolved { .. })
                    && inspector.merge_in_progress().await
                {
                    if let Err(e) = lifecycle.abort_merge().await {
                        warn!(error = %e, "failed to abort merge before restoring");
                    }
                }
                if session.needs_restore() {
                    session.advance(MergePhase::RestoringOriginalBranch);
                    if let Err(restore_error) = self.restore(&lifecycle, &source).await {
                        return Err(Error::RestoreFailed {
                            branch: source,
                            reason: format!("{error}; then {restore_error}"),
                        });
                    }
                }
                Err(error)
            }
        }
    }

    /// Validate the repository and source branch; returns the source branch
    async fn prepare(&self, inspector: &Inspector, lifecycle: &BranchLifecycle) -> Result<String> {
        if !inspector.is_repository().await {
            return Err(Error::NotARepository(
                "run this from inside a git working tree".to_string(),
            ));
        }

        let source = inspector.current_branch().await?;
        let settings = self.settings.load()?;
        if settings.feature_prefix_of(&source).is_none() {
            return Err(Error::NotFeatureBranch {
                branch: source,
                accepted: settings.branch_prefixes.join(", "),
            });
        }

        // The source must be on the remote before anything is merged from it
        if inspector.remote_branch_exists(&source).await {
            lifecycle.ensure_upstream(&source).await?;
        } else {
            self.progress
                .on_message(&format!("Publishing {source} to {}...", inspector.remote()))
                .await;
            lifecycle.push_with_upstream(&source).await?;
        }

        if inspector.has_uncommitted_changes().await? {
            self.commit_pending_changes(lifecycle, &source).await?;
        }

        Ok(source)
    }

    /// Offer to commit and push uncommitted work; declining fails the workflow
    async fn commit_pending_changes(&self, lifecycle: &BranchLifecycle, source: &str) -> Result<()> {
        let choice = self
            .prompter
            .confirm(
                &format!("'{source}' has uncommitted changes. Commit and push them before merging?"),
                &["Commit and push", "Stop"],
            )
            .await?;
        if choice != Some(0) {
            return Err(Error::Precondition(format!(
                "'{source}' has uncommitted changes; commit or stash them before merging"
            )));
        }

        let not_empty = |s: &str| {
            if s.trim().is_empty() {
                crate::types::ValidationResult::invalid("commit message cannot be empty")
            } else {
                crate::types::ValidationResult::valid()
            }
        };
        let message = self
            .prompter
            .input("Commit message", "Work in progress", &not_empty)
            .await?
            .ok_or(Error::Cancelled)?;

        lifecycle.commit(&message).await?;
        lifecycle.push(source).await?;
        self.progress
            .on_message(&format!("Committed and pushed pending changes on {source}."))
            .await;
        Ok(())
    }

    /// Ask which configured target to merge into
    async fn select_target(&self) -> Result<String> {
        let settings = self.settings.load()?;
        if settings.target_branches.is_empty() {
            return Err(Error::NoTargetBranches);
        }
        let labels: Vec<String> = settings
            .target_branches
            .iter()
            .map(|t| {
                if t.description.is_empty() {
                    t.name.clone()
                } else {
                    format!("{} - {}", t.name, t.description)
                }
            })
            .collect();
        let index = self
            .prompter
            .select("Merge into which branch?", &labels)
            .await?
            .ok_or(Error::Cancelled)?;
        settings
            .target_branches
            .get(index)
            .map(|t| t.name.clone())
            .ok_or(Error::Cancelled)
    }

    async fn merge_and_push(
        &self,
        session: &mut MergeSession,
        inspector: &Inspector,
        lifecycle: &BranchLifecycle,
        source: &str,
        target: &str,
    ) -> Result<MergeStage> {
        // Probe once; the answer also decides how the target is pushed
        let target_on_remote = inspector.remote_branch_exists(target).await;
        lifecycle.checkout(target).await?;
        if target_on_remote {
            lifecycle.ensure_upstream(target).await?;
            lifecycle.pull().await?;
        }

        if let Err(merge_error) = lifecycle.merge(source).await {
            match inspector.has_merge_conflicts().await {
                Ok(true) => {}
                Ok(false) => return Err(merge_error),
                Err(e) => {
                    warn!(error = %e, "could not check for conflicts after failed merge");
                    return Err(merge_error);
                }
            }
            session.advance(MergePhase::ConflictPending);
            session.conflict_files = inspector.conflicted_files().await;

            let mediator = ConflictMediator {
                prompter: self.prompter.as_ref(),
                inspector,
                lifecycle,
                source,
                target,
            };
            match mediator.run(&session.conflict_files).await? {
                ConflictResolution::Resolved => {}
                ConflictResolution::OpenedFile(file) => return Ok(MergeStage::OpenedFile(file)),
            }
        }

        session.advance(MergePhase::Pushing);
        // A target that was only created locally gets published with tracking
        if target_on_remote {
            lifecycle.push(target).await?;
        } else {
            lifecycle.push_with_upstream(target).await?;
        }
        Ok(MergeStage::Pushed)
    }

    /// Switch back to the original branch and re-link its upstream
    async fn restore(&self, lifecycle: &BranchLifecycle, original: &str) -> Result<()> {
        lifecycle.checkout(original).await?;
        if let Err(e) = lifecycle.ensure_upstream(original).await {
            warn!(branch = original, error = %e, "restored branch but could not reconcile upstream");
        }
        Ok(())
    }
}
