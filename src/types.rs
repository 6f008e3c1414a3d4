//! Core types for branchflow

use serde::{Deserialize, Serialize};

/// A configured branch category tag, e.g. `feature` or `bugfix`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchPrefix {
    /// Prefix text (letters, digits, `_`, `-`)
    pub prefix: String,
}

impl BranchPrefix {
    /// Wrap a prefix string
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Whether `branch` lives under this prefix (`<prefix>/...`)
    pub fn matches(&self, branch: &str) -> bool {
        branch
            .strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl std::fmt::Display for BranchPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.prefix)
    }
}

/// The pieces a conventional branch name is composed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchNameComponents {
    /// Category prefix
    pub prefix: String,
    /// Pre-formatted date segment
    pub date: String,
    /// Short description of the work
    pub description: String,
    /// Author identity segment
    pub author: String,
}

/// A snapshot of one local or remote-tracking branch
///
/// Never mutated; re-enumerate when repository state may have changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitBranchRef {
    /// Short ref name (`feature/x` or `origin/feature/x`)
    pub name: String,
    /// Whether this is the checked-out branch
    pub is_current: bool,
    /// Whether this is a remote-tracking ref
    pub is_remote: bool,
    /// Abbreviated commit hash
    pub commit_hash: String,
}

/// A downstream branch feature branches get merged into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetBranchConfig {
    /// Branch name
    pub name: String,
    /// Human-readable label shown in the target picker
    #[serde(default)]
    pub description: String,
}

impl TargetBranchConfig {
    /// Create a target entry
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Outcome of a syntax check
///
/// Errors are display strings so interactive validators can show them inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the input passed
    pub is_valid: bool,
    /// Reason for rejection
    pub error: Option<String>,
}

impl ValidationResult {
    /// A passing result
    pub const fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    /// A failing result with a reason
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }

    /// Convert into a `Result` carrying the error text
    pub fn into_result(self) -> std::result::Result<(), String> {
        match self.error {
            Some(error) if !self.is_valid => Err(error),
            _ if !self.is_valid => Err("invalid input".to_string()),
            _ => Ok(()),
        }
    }
}
