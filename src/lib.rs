//! branchflow - conventional branch names and guarded merges for git
//!
//! Two workflows sit on top of the `git` CLI:
//!
//! - **create**: compose `prefix/date/description_author` from interactive
//!   choices, validate it against git's ref rules, and create the branch.
//! - **merge**: merge the current feature branch into a configured target
//!   (e.g. `test`, `uat`), walk the user through conflicts, push, and switch
//!   back to the feature branch no matter how the merge ended.
//!
//! Repository access goes through [`vcs::VcsExecutor`] and user decisions
//! through [`prompt::Prompter`], so both workflows run unchanged against a
//! scripted fake in tests.

pub mod config;
pub mod error;
pub mod naming;
pub mod prompt;
pub mod repo;
pub mod types;
pub mod vcs;
pub mod workflow;

pub use config::{FileSettings, Settings, SettingsSource};
pub use error::{Error, Result};
pub use workflow::{BranchCreator, CreateOutcome, MergeOrchestrator, MergeOutcome};
