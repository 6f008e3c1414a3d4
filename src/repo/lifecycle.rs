//! Branch write operations
//!
//! Each operation is one git invocation with no internal retry. Commit is
//! stage-all plus commit, and anything built on a remote branch fetches it
//! first. Failures come back as [`Error::Branch`] carrying
//! the underlying git error text; retry and rollback policy belong to the
//! workflows.

use crate::error::{Error, Result};
use crate::repo::Inspector;
use crate::types::GitBranchRef;
use tracing::{debug, info, warn};

/// How [`BranchLifecycle::checkout`] reached the branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutKind {
    /// An existing local branch was checked out
    Local,
    /// A local branch was created from its remote counterpart
    FromRemote,
    /// No branch existed anywhere, so a fresh one was created at HEAD
    Created,
}

/// What [`BranchLifecycle::ensure_upstream`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamAction {
    /// No same-named remote branch; nothing to track
    NoRemote,
    /// Upstream already pointed at the remote branch
    AlreadySet,
    /// Upstream was missing or pointed elsewhere and has been set
    Set,
}

/// Mutating branch operations
#[derive(Clone)]
pub struct BranchLifecycle {
    inspector: Inspector,
}

fn wrap(action: String) -> impl FnOnce(Error) -> Error {
    move |e| Error::Branch(format!("failed to {action}: {e}"))
}

impl BranchLifecycle {
    /// Create a lifecycle manager sharing the inspector's executor and remote
    pub const fn new(inspector: Inspector) -> Self {
        Self { inspector }
    }

    /// Inspector used for existence checks
    pub const fn inspector(&self) -> &Inspector {
        &self.inspector
    }

    fn remote(&self) -> &str {
        self.inspector.remote()
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        self.inspector.vcs().run(args).await
    }

    /// Check out `name`, wherever it lives
    ///
    /// Local branch first, then a new local branch from the remote
    /// counterpart (fetched first), otherwise a fresh branch at HEAD.
    pub async fn checkout(&self, name: &str) -> Result<CheckoutKind> {
        let kind = if self.inspector.local_branch_exists(name).await {
            self.git(&["checkout", name])
                .await
                .map_err(wrap(format!("checkout '{name}'")))?;
            CheckoutKind::Local
        } else if self.inspector.remote_branch_exists(name).await {
            // ls-remote saw it, but the tracking ref may predate the last fetch
            self.fetch(name).await?;
            let remote_ref = format!("{}/{name}", self.remote());
            self.git(&["checkout", "-b", name, &remote_ref])
                .await
                .map_err(wrap(format!("checkout '{name}' from '{remote_ref}'")))?;
            CheckoutKind::FromRemote
        } else {
            self.git(&["checkout", "-b", name])
                .await
                .map_err(wrap(format!("create and checkout '{name}'")))?;
            CheckoutKind::Created
        };
        debug!(branch = name, ?kind, "checked out");
        Ok(kind)
    }

    /// Create `name` from `base` and switch to it
    pub async fn create_and_checkout(&self, name: &str, base: &GitBranchRef) -> Result<()> {
        self.git(&["checkout", "-b", name, &base.name])
            .await
            .map_err(wrap(format!("create branch '{name}' from '{}'", base.name)))?;
        self.detach_remote_base(name, base).await;
        info!(branch = name, base = %base.name, "created and checked out branch");
        Ok(())
    }

    /// Create `name` from `base` without switching to it
    pub async fn create_only(&self, name: &str, base: &GitBranchRef) -> Result<()> {
        self.git(&["branch", name, &base.name])
            .await
            .map_err(wrap(format!("create branch '{name}' from '{}'", base.name)))?;
        self.detach_remote_base(name, base).await;
        info!(branch = name, base = %base.name, "created branch");
        Ok(())
    }

    /// Drop the tracking link git adds when branching from a remote ref
    async fn detach_remote_base(&self, name: &str, base: &GitBranchRef) {
        if !base.is_remote {
            return;
        }
        if let Err(e) = self.git(&["branch", "--unset-upstream", name]).await {
            warn!(branch = name, error = %e, "failed to clear upstream of new branch");
        }
    }

    /// Point `name`'s upstream at its same-named remote branch, if one exists
    pub async fn ensure_upstream(&self, name: &str) -> Result<UpstreamAction> {
        if !self.inspector.remote_branch_exists(name).await {
            return Ok(UpstreamAction::NoRemote);
        }
        let expected = format!("{}/{name}", self.remote());
        if self.inspector.upstream_of(name).await.as_deref() == Some(expected.as_str()) {
            return Ok(UpstreamAction::AlreadySet);
        }
        self.fetch(name).await?;
        let flag = format!("--set-upstream-to={expected}");
        self.git(&["branch", &flag, name])
            .await
            .map_err(wrap(format!("set upstream of '{name}' to '{expected}'")))?;
        info!(branch = name, upstream = %expected, "upstream set");
        Ok(UpstreamAction::Set)
    }

    /// Bring the remote-tracking ref of `name` up to date with the remote
    pub async fn fetch(&self, name: &str) -> Result<()> {
        let refspec = format!("+refs/heads/{name}:refs/remotes/{}/{name}", self.remote());
        self.git(&["fetch", self.remote(), &refspec])
            .await
            .map_err(wrap(format!("fetch '{name}' from '{}'", self.remote())))?;
        debug!(branch = name, remote = self.remote(), "fetched");
        Ok(())
    }

    /// Pull the current branch from its upstream
    pub async fn pull(&self) -> Result<()> {
        self.git(&["pull", "--no-edit"])
            .await
            .map_err(wrap("pull".to_string()))?;
        Ok(())
    }

    /// Push `name` to the remote
    pub async fn push(&self, name: &str) -> Result<()> {
        self.git(&["push", self.remote(), name])
            .await
            .map_err(wrap(format!("push '{name}'")))?;
        Ok(())
    }

    /// Push `name` and record the remote branch as its upstream
    pub async fn push_with_upstream(&self, name: &str) -> Result<()> {
        self.git(&["push", "-u", self.remote(), name])
            .await
            .map_err(wrap(format!("push '{name}' with upstream")))?;
        Ok(())
    }

    /// Merge `source` into the current branch
    pub async fn merge(&self, source: &str) -> Result<()> {
        self.git(&["merge", "--no-edit", source])
            .await
            .map_err(wrap(format!("merge '{source}'")))?;
        Ok(())
    }

    /// Stage everything and commit with `message`
    pub async fn commit(&self, message: &str) -> Result<()> {
        self.git(&["add", "-A"])
            .await
            .map_err(wrap("stage changes".to_string()))?;
        self.git(&["commit", "-m", message])
            .await
            .map_err(wrap("commit".to_string()))?;
        Ok(())
    }

    /// Abort the merge in progress
    pub async fn abort_merge(&self) -> Result<()> {
        self.git(&["merge", "--abort"])
            .await
            .map_err(wrap("abort merge".to_string()))?;
        Ok(())
    }
}
