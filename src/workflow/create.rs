//! Conventional branch creation workflow
//!
//! Prefix -> base branch -> author -> description -> existence check ->
//! confirmation -> create. Dismissing any prompt ends the flow as
//! [`CreateOutcome::Cancelled`]; nothing is written before the final step
//! (or before checking out an existing branch, if the user picks that).

use crate::config::SettingsSource;
use crate::error::{Error, Result};
use crate::naming::{
    format_date, generate_branch_name, normalize_author, sort_branches_for_selection,
    validate_branch_name, validate_description,
};
use crate::prompt::Prompter;
use crate::repo::Inspector;
use crate::types::{BranchNameComponents, GitBranchRef};
use crate::vcs::VcsExecutor;
use crate::workflow::{ProgressCallback, repository};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

/// How a branch creation run ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new branch was created
    Created {
        /// New branch name
        name: String,
        /// Branch it was created from
        base: String,
        /// Whether it is now checked out
        checked_out: bool,
    },
    /// The composed name already existed and the user switched to it instead
    CheckedOutExisting {
        /// Existing branch name
        name: String,
    },
    /// User dismissed a prompt
    Cancelled,
}

/// Interactive creator for `prefix/date/description_author` branches
pub struct BranchCreator {
    vcs: Arc<dyn VcsExecutor>,
    prompter: Arc<dyn Prompter>,
    settings: Arc<dyn SettingsSource>,
    progress: Arc<dyn ProgressCallback>,
    today: Option<NaiveDate>,
}

/// Picker label for a branch
fn branch_label(branch: &GitBranchRef) -> String {
    let tag = if branch.is_current {
        " (current)"
    } else if branch.is_remote {
        " (remote)"
    } else {
        ""
    };
    if branch.commit_hash.is_empty() {
        format!("{}{tag}", branch.name)
    } else {
        format!("{}{tag}  {}", branch.name, branch.commit_hash)
    }
}

impl BranchCreator {
    /// Create a branch creator
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
            today: None,
        }
    }

    /// Use a fixed date instead of the local clock
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Run the interactive flow
    pub async fn create_branch(&self) -> Result<CreateOutcome> {
        match self.run().await {
            Err(Error::Cancelled) => Ok(CreateOutcome::Cancelled),
            other => other,
        }
    }

    async fn run(&self) -> Result<CreateOutcome> {
        let settings = self.settings.load()?;
        let (inspector, lifecycle) = repository(&self.vcs, &settings);
        if !inspector.is_repository().await {
            return Err(Error::NotARepository(
                "run this from inside a git working tree".to_string(),
            ));
        }

        let prefix = self.select_prefix().await?;
        let base = self.select_base(&inspector).await?;
        let author = self.resolve_author(&inspector).await?;
        let date = format_date(&self.today(), self.settings.load()?.date_format);

        // Re-prompt until the name is free or the user takes the existing branch
        let (name, description) = loop {
            let compose = |description: &str| {
                generate_branch_name(&BranchNameComponents {
                    prefix: prefix.clone(),
                    date: date.clone(),
                    description: description.to_string(),
                    author: author.clone(),
                })
            };
            // Check the description alone first so its error message wins
            let validator = |description: &str| {
                let result = validate_description(description);
                if !result.is_valid {
                    return result;
                }
                validate_branch_name(&compose(description))
            };
            let description = self
                .prompter
                .input(
                    &format!("Description for {}", compose("<description>")),
                    "login-page",
                    &validator,
                )
                .await?
                .ok_or(Error::Cancelled)?;
            let name = compose(&description);

            if !inspector.branch_exists(&name).await {
                break (name, description);
            }

            let choice = self
                .prompter
                .confirm(
                    &format!("Branch '{name}' already exists."),
                    &[
                        "Check out the existing branch",
                        "Enter a different description",
                        "Cancel",
                    ],
                )
                .await?;
            match choice {
                Some(0) => {
                    lifecycle.checkout(&name).await?;
                    self.progress
                        .on_message(&format!("Switched to existing branch {name}."))
                        .await;
                    return Ok(CreateOutcome::CheckedOutExisting { name });
                }
                Some(1) => {}
                _ => return Err(Error::Cancelled),
            }
        };

        let summary = format!(
            "Create branch?\n  base:        {}\n  name:        {name}\n  description: {description}\n  author:      {author}",
            base.name
        );
        if self
            .prompter
            .confirm(&summary, &["Create branch", "Cancel"])
            .await?
            != Some(0)
        {
            return Err(Error::Cancelled);
        }

        // Reloaded so a setting changed while prompting takes effect
        let checked_out = self.settings.load()?.auto_checkout;
        if checked_out {
            lifecycle.create_and_checkout(&name, &base).await?;
        } else {
            lifecycle.create_only(&name, &base).await?;
        }
        info!(branch = %name, base = %base.name, checked_out, "branch created");
        self.progress
            .on_message(&format!("Created {name} from {}.", base.name))
            .await;

        Ok(CreateOutcome::Created {
            name,
            base: base.name,
            checked_out,
        })
    }

    /// Pick a prefix; skipped when exactly one is configured
    async fn select_prefix(&self) -> Result<String> {
        let prefixes = self.settings.load()?.branch_prefixes;
        match prefixes.as_slice() {
            [] => Err(Error::Precondition("no branch prefixes are configured".into())),
            [only] => Ok(only.clone()),
            _ => {
                let index = self
                    .prompter
                    .select("Branch type", &prefixes)
                    .await?
                    .ok_or(Error::Cancelled)?;
                prefixes.get(index).cloned().ok_or(Error::Cancelled)
            }
        }
    }

    /// Pick the branch to create from: current, then local, then remote
    async fn select_base(&self, inspector: &Inspector) -> Result<GitBranchRef> {
        let mut branches = inspector.list_branches().await?;
        if branches.is_empty() {
            return Err(Error::Precondition(
                "repository has no branches yet; make an initial commit first".into(),
            ));
        }
        sort_branches_for_selection(&mut branches);
        let labels: Vec<String> = branches.iter().map(branch_label).collect();
        let index = self
            .prompter
            .select("Base branch", &labels)
            .await?
            .ok_or(Error::Cancelled)?;
        if index >= branches.len() {
            return Err(Error::Cancelled);
        }
        Ok(branches.swap_remove(index))
    }

    /// Configured override first, then git `user.name`
    async fn resolve_author(&self, inspector: &Inspector) -> Result<String> {
        let configured = self.settings.load()?.author_name;
        let raw = match configured.filter(|n| !n.trim().is_empty()) {
            Some(name) => name,
            None => inspector.configured_user_name().await.ok_or_else(|| {
                Error::Precondition(
                    "could not determine the author; set git user.name or author_name".into(),
                )
            })?,
        };
        normalize_author(&raw).ok_or_else(|| {
            Error::Precondition("author name is empty after normalization".into())
        })
    }
}
