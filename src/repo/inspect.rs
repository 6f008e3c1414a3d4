//! Read-only repository queries

use crate::error::{Error, Result};
use crate::naming::is_conflict_status;
use crate::types::GitBranchRef;
use crate::vcs::VcsExecutor;
use std::sync::Arc;
use tracing::{debug, warn};

const LOCAL_FORMAT: &str = "--format=%(refname:short)%09%(objectname:short)";
const REMOTE_FORMAT: &str = "--format=%(refname:short)%09%(objectname:short)%09%(symref)";

/// Read-only view of the repository
///
/// Existence probes return plain booleans: any command failure means
/// "does not exist" and is never surfaced as an error.
#[derive(Clone)]
pub struct Inspector {
    vcs: Arc<dyn VcsExecutor>,
    remote: String,
}

impl Inspector {
    /// Create an inspector talking to `remote` for remote-side probes
    pub fn new(vcs: Arc<dyn VcsExecutor>, remote: impl Into<String>) -> Self {
        Self {
            vcs,
            remote: remote.into(),
        }
    }

    /// Remote name used for probes
    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub(crate) fn vcs(&self) -> &dyn VcsExecutor {
        self.vcs.as_ref()
    }

    /// Whether the working directory is inside a git work tree
    pub async fn is_repository(&self) -> bool {
        matches!(
            self.vcs.run(&["rev-parse", "--is-inside-work-tree"]).await.as_deref(),
            Ok("true")
        )
    }

    /// Name of the checked-out branch
    ///
    /// Fails with [`Error::NotOnBranch`] on a detached HEAD.
    pub async fn current_branch(&self) -> Result<String> {
        match self.vcs.run(&["symbolic-ref", "--short", "HEAD"]).await {
            Ok(name) if !name.is_empty() => Ok(name),
            Ok(_) => Err(Error::NotOnBranch),
            Err(e) => {
                debug!(error = %e, "no current branch");
                Err(Error::NotOnBranch)
            }
        }
    }

    /// Local branches followed by remote-tracking branches
    ///
    /// The symbolic `<remote>/HEAD` entry is skipped. Failing to list remote
    /// branches yields an empty remote set rather than an error.
    pub async fn list_branches(&self) -> Result<Vec<GitBranchRef>> {
        let current = self.current_branch().await.ok();
        let local = self.vcs.run(&["branch", "--list", LOCAL_FORMAT]).await?;

        let mut branches: Vec<GitBranchRef> = local
            .lines()
            .filter_map(|line| {
                let mut fields = line.split('\t');
                let name = fields.next()?.trim();
                if name.is_empty() || name.starts_with('(') {
                    return None;
                }
                Some(GitBranchRef {
                    name: name.to_string(),
                    is_current: current.as_deref() == Some(name),
                    is_remote: false,
                    commit_hash: fields.next().unwrap_or_default().trim().to_string(),
                })
            })
            .collect();

        match self.vcs.run(&["branch", "--remotes", REMOTE_FORMAT]).await {
            Ok(remote) => branches.extend(remote.lines().filter_map(parse_remote_line)),
            Err(e) => warn!(error = %e, "failed to list remote branches, continuing without them"),
        }

        Ok(branches)
    }

    /// Whether `status --porcelain` reports anything
    pub async fn has_uncommitted_changes(&self) -> Result<bool> {
        let status = self.vcs.run(&["status", "--porcelain"]).await?;
        Ok(!status.is_empty())
    }

    /// Whether any path is in an unmerged state
    pub async fn has_merge_conflicts(&self) -> Result<bool> {
        let status = self.vcs.run(&["status", "--porcelain"]).await?;
        Ok(status.lines().any(is_conflict_status))
    }

    /// Whether a merge (including one started by `pull`) is in progress
    pub async fn merge_in_progress(&self) -> bool {
        self.vcs
            .run(&["rev-parse", "--verify", "--quiet", "MERGE_HEAD"])
            .await
            .is_ok()
    }

    /// Paths with unmerged index entries; empty if the query fails
    pub async fn conflicted_files(&self) -> Vec<String> {
        match self
            .vcs
            .run(&["diff", "--name-only", "--diff-filter=U"])
            .await
        {
            Ok(out) => out
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
            Err(e) => {
                debug!(error = %e, "could not list conflicted files");
                Vec::new()
            }
        }
    }

    /// Whether `name` exists as a head on the remote
    pub async fn remote_branch_exists(&self, name: &str) -> bool {
        let wanted = format!("refs/heads/{name}");
        match self
            .vcs
            .run(&["ls-remote", "--heads", &self.remote, name])
            .await
        {
            Ok(out) => out
                .lines()
                .any(|line| line.split_whitespace().nth(1) == Some(wanted.as_str())),
            Err(e) => {
                debug!(branch = name, error = %e, "remote probe failed, treating as absent");
                false
            }
        }
    }

    /// Whether a local branch `name` exists
    pub async fn local_branch_exists(&self, name: &str) -> bool {
        let refname = format!("refs/heads/{name}");
        self.vcs
            .run(&["rev-parse", "--verify", "--quiet", &refname])
            .await
            .is_ok()
    }

    /// Whether `name` exists locally or on the remote
    pub async fn branch_exists(&self, name: &str) -> bool {
        self.local_branch_exists(name).await || self.remote_branch_exists(name).await
    }

    /// Upstream of a local branch (`origin/x`), or `None`
    ///
    /// A failing probe is reported as "no upstream", whatever the cause.
    pub async fn upstream_of(&self, name: &str) -> Option<String> {
        let spec = format!("{name}@{{upstream}}");
        match self.vcs.run(&["rev-parse", "--abbrev-ref", &spec]).await {
            Ok(upstream) if !upstream.is_empty() => Some(upstream),
            Ok(_) => None,
            Err(e) => {
                debug!(branch = name, error = %e, "no upstream configured");
                None
            }
        }
    }

    /// `user.name` from git configuration
    pub async fn configured_user_name(&self) -> Option<String> {
        self.vcs
            .run(&["config", "user.name"])
            .await
            .ok()
            .filter(|name| !name.trim().is_empty())
    }
}

fn parse_remote_line(line: &str) -> Option<GitBranchRef> {
    let mut fields = line.split('\t');
    let name = fields.next()?.trim();
    let commit = fields.next().unwrap_or_default().trim();
    let symref = fields.next().unwrap_or_default().trim();
    if name.is_empty() || !symref.is_empty() || name.ends_with("/HEAD") || !name.contains('/') {
        return None;
    }
    Some(GitBranchRef {
        name: name.to_string(),
        is_current: false,
        is_remote: true,
        commit_hash: commit.to_string(),
    })
}
