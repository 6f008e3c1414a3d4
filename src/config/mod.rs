//! User configuration
//!
//! Workflows read settings through [`SettingsSource`] at each step that needs
//! them, so edits made while a workflow is waiting on a prompt are picked up.

mod storage;

pub use crate::naming::DateFormat;
pub use storage::{FileSettings, default_config_path};

use crate::error::{Error, Result};
use crate::naming::{validate_branch_name, validate_prefix};
use crate::repo::DEFAULT_REMOTE;
use crate::types::{BranchPrefix, TargetBranchConfig};
use serde::{Deserialize, Serialize};

/// Anything that can produce the current settings
pub trait SettingsSource: Send + Sync {
    /// Load a fresh copy of the settings
    fn load(&self) -> Result<Settings>;
}

/// All user-tunable behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Accepted feature-branch prefixes
    #[serde(default = "default_prefixes")]
    pub branch_prefixes: Vec<String>,
    /// Author segment override; falls back to git `user.name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    /// Date segment layout
    #[serde(default)]
    pub date_format: DateFormat,
    /// Switch to newly created branches
    #[serde(default = "default_auto_checkout")]
    pub auto_checkout: bool,
    /// Remote used for pushes, pulls and existence checks
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Merge destinations (never empty)
    #[serde(default = "default_targets")]
    pub target_branches: Vec<TargetBranchConfig>,
}

fn default_prefixes() -> Vec<String> {
    vec!["feature".into(), "bugfix".into(), "hotfix".into()]
}

const fn default_auto_checkout() -> bool {
    true
}

fn default_targets() -> Vec<TargetBranchConfig> {
    vec![
        TargetBranchConfig::new("test", "Test environment"),
        TargetBranchConfig::new("uat", "User acceptance testing"),
    ]
}

fn default_remote() -> String {
    DEFAULT_REMOTE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            branch_prefixes: default_prefixes(),
            author_name: None,
            date_format: DateFormat::default(),
            auto_checkout: default_auto_checkout(),
            remote: default_remote(),
            target_branches: default_targets(),
        }
    }
}

impl Settings {
    /// Configured prefixes as typed values
    pub fn prefixes(&self) -> Vec<BranchPrefix> {
        self.branch_prefixes.iter().map(BranchPrefix::new).collect()
    }

    /// Prefix that `branch` falls under, if any
    pub fn feature_prefix_of(&self, branch: &str) -> Option<BranchPrefix> {
        self.prefixes().into_iter().find(|p| p.matches(branch))
    }

    /// Check invariants a loaded file must satisfy
    pub fn validate(&self) -> Result<()> {
        if self.branch_prefixes.is_empty() {
            return Err(Error::Config("at least one branch prefix is required".into()));
        }
        for prefix in &self.branch_prefixes {
            validate_prefix(prefix)
                .into_result()
                .map_err(|e| Error::Config(format!("invalid prefix '{prefix}': {e}")))?;
        }
        if self.target_branches.is_empty() {
            return Err(Error::Config("at least one target branch is required".into()));
        }
        for target in &self.target_branches {
            validate_branch_name(&target.name)
                .into_result()
                .map_err(|e| Error::Config(format!("invalid target '{}': {e}", target.name)))?;
        }
        if self.remote.trim().is_empty() {
            return Err(Error::Config("remote name cannot be empty".into()));
        }
        Ok(())
    }

    /// Append a merge target
    pub fn add_target_branch(&mut self, target: TargetBranchConfig) -> Result<()> {
        validate_branch_name(&target.name)
            .into_result()
            .map_err(|e| Error::Config(format!("invalid target '{}': {e}", target.name)))?;
        if self.target_branches.iter().any(|t| t.name == target.name) {
            return Err(Error::Config(format!(
                "target '{}' is already configured",
                target.name
            )));
        }
        self.target_branches.push(target);
        Ok(())
    }

    /// Remove a merge target; the list may never become empty
    pub fn remove_target_branch(&mut self, name: &str) -> Result<TargetBranchConfig> {
        let index = self
            .target_branches
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| Error::Config(format!("target '{name}' is not configured")))?;
        if self.target_branches.len() == 1 {
            return Err(Error::Config(
                "cannot remove the last target branch; add another one first".into(),
            ));
        }
        Ok(self.target_branches.remove(index))
    }

    /// Append a branch prefix
    pub fn add_prefix(&mut self, prefix: &str) -> Result<()> {
        validate_prefix(prefix)
            .into_result()
            .map_err(|e| Error::Config(format!("invalid prefix '{prefix}': {e}")))?;
        if self.branch_prefixes.iter().any(|p| p == prefix) {
            return Err(Error::Config(format!("prefix '{prefix}' is already configured")));
        }
        self.branch_prefixes.push(prefix.to_string());
        Ok(())
    }

    /// Remove a branch prefix; the list may never become empty
    pub fn remove_prefix(&mut self, prefix: &str) -> Result<()> {
        let index = self
            .branch_prefixes
            .iter()
            .position(|p| p == prefix)
            .ok_or_else(|| Error::Config(format!("prefix '{prefix}' is not configured")))?;
        if self.branch_prefixes.len() == 1 {
            return Err(Error::Config("cannot remove the last branch prefix".into()));
        }
        self.branch_prefixes.remove(index);
        Ok(())
    }
}
