//! Stateful fake of the git CLI
//!
//! Interprets exactly the commands the inspector and lifecycle manager issue
//! and keeps just enough repository state (branches, upstreams, dirty tree,
//! merge in progress) for the workflows to behave as they would against git.
//! Heads on the remote and the local `origin/*` tracking refs are separate:
//! a branch published elsewhere is invisible to `origin/<name>` until fetched.

#![allow(dead_code)]

use async_trait::async_trait;
use branchflow::error::{Error, Result};
use branchflow::vcs::VcsExecutor;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

const REMOTE: &str = "origin";

#[derive(Debug, Default)]
struct State {
    is_repo: bool,
    current: Option<String>,
    local: BTreeMap<String, String>,
    // Heads as `ls-remote` sees them
    remote: BTreeMap<String, String>,
    // refs/remotes/origin/*, as of the last fetch or push
    tracking: BTreeMap<String, String>,
    upstreams: HashMap<String, String>,
    user_name: Option<String>,
    dirty: bool,
    merging: bool,
    conflicts: Vec<String>,
    next_hash: u32,
    // Target branch -> files that conflict when anything is merged into it
    conflicts_on: HashMap<String, Vec<String>>,
    // Branch -> files that conflict when pulling it
    pull_conflicts_on: HashMap<String, Vec<String>>,
    // Conflict checks left before the user "fixes" the files
    resolve_after: Option<u32>,
    // (command prefix, message, matching calls still allowed through)
    failures: Vec<(String, String, usize)>,
    calls: Vec<String>,
    merges: Vec<(String, String)>,
    commits: Vec<String>,
    pushes: Vec<String>,
}

impl State {
    fn hash(&mut self) -> String {
        self.next_hash += 1;
        format!("c0ffee{:02}", self.next_hash)
    }

    fn head_hash(&self) -> String {
        self.current
            .as_ref()
            .and_then(|b| self.local.get(b))
            .cloned()
            .unwrap_or_else(|| "0000000".to_string())
    }
}

fn fail(args: &[&str], message: impl Into<String>) -> Error {
    Error::Vcs {
        command: args.join(" "),
        message: message.into(),
    }
}

/// In-memory git with call tracking, conflict and failure injection
///
/// Starts as a repository on `main`, with `main` published to `origin`.
pub struct FakeGit {
    state: Mutex<State>,
}

impl Default for FakeGit {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGit {
    /// Repository on `main`, clean, `main` present locally and on the remote
    pub fn new() -> Self {
        let fake = Self {
            state: Mutex::new(State {
                is_repo: true,
                user_name: Some("Alice Smith".to_string()),
                ..State::default()
            }),
        };
        fake.add_local("main");
        fake.add_remote("main");
        fake.set_upstream("main");
        fake.checkout_quietly("main");
        fake
    }

    /// Working directory that is not a repository
    pub fn not_a_repository() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    // === Setup ===

    /// Add a local branch
    pub fn add_local(&self, name: &str) {
        let mut s = self.state.lock().unwrap();
        let hash = s.hash();
        s.local.insert(name.to_string(), hash);
    }

    /// Add a branch on the remote, already fetched
    pub fn add_remote(&self, name: &str) {
        let mut s = self.state.lock().unwrap();
        let hash = s.hash();
        s.remote.insert(name.to_string(), hash.clone());
        s.tracking.insert(name.to_string(), hash);
    }

    /// Add a branch someone else pushed after our last fetch
    pub fn publish_elsewhere(&self, name: &str) {
        let mut s = self.state.lock().unwrap();
        let hash = s.hash();
        s.remote.insert(name.to_string(), hash);
    }

    /// Make `name` track `origin/<name>`
    pub fn set_upstream(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .upstreams
            .insert(name.to_string(), format!("{REMOTE}/{name}"));
    }

    /// Local branch, published, tracking its remote counterpart
    pub fn add_published(&self, name: &str) {
        self.add_local(name);
        self.add_remote(name);
        self.set_upstream(name);
    }

    /// Switch branches without recording a call
    pub fn checkout_quietly(&self, name: &str) {
        self.state.lock().unwrap().current = Some(name.to_string());
    }

    /// Detach HEAD
    pub fn detach_head(&self) {
        self.state.lock().unwrap().current = None;
    }

    /// Mark the working tree as having uncommitted changes
    pub fn make_dirty(&self) {
        self.state.lock().unwrap().dirty = true;
    }

    /// Set or clear `user.name`
    pub fn set_user_name(&self, name: Option<&str>) {
        self.state.lock().unwrap().user_name = name.map(String::from);
    }

    /// Merging anything into `target` stops with conflicts in `files`
    pub fn conflict_when_merging_into(&self, target: &str, files: &[&str]) {
        self.state.lock().unwrap().conflicts_on.insert(
            target.to_string(),
            files.iter().map(|f| (*f).to_string()).collect(),
        );
    }

    /// Pulling `branch` stops with conflicts in `files`
    pub fn conflict_when_pulling(&self, branch: &str, files: &[&str]) {
        self.state.lock().unwrap().pull_conflicts_on.insert(
            branch.to_string(),
            files.iter().map(|f| (*f).to_string()).collect(),
        );
    }

    /// Conflicts disappear (leaving staged, uncommitted changes) after being
    /// reported by `checks` status queries
    pub fn resolve_conflicts_after(&self, checks: u32) {
        self.state.lock().unwrap().resolve_after = Some(checks);
    }

    /// Make every command starting with `prefix` fail with `message`
    pub fn fail_command(&self, prefix: &str, message: &str) {
        self.fail_command_after(prefix, 0, message);
    }

    /// Like [`FakeGit::fail_command`], but the first `successes` matching calls go through
    pub fn fail_command_after(&self, prefix: &str, successes: usize, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((prefix.to_string(), message.to_string(), successes));
    }

    // === Inspection ===

    /// Every command run, space-joined, in order
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Whether `command` was run
    pub fn ran(&self, command: &str) -> bool {
        self.calls().iter().any(|c| c == command)
    }

    /// How many times `command` was run
    pub fn count(&self, command: &str) -> usize {
        self.calls().iter().filter(|c| *c == command).count()
    }

    /// Checked-out branch
    pub fn current(&self) -> Option<String> {
        self.state.lock().unwrap().current.clone()
    }

    /// Whether a local branch exists
    pub fn has_local(&self, name: &str) -> bool {
        self.state.lock().unwrap().local.contains_key(name)
    }

    /// Whether the remote has the branch
    pub fn has_remote(&self, name: &str) -> bool {
        self.state.lock().unwrap().remote.contains_key(name)
    }

    /// Whether `origin/<name>` exists locally
    pub fn has_tracking(&self, name: &str) -> bool {
        self.state.lock().unwrap().tracking.contains_key(name)
    }

    /// Upstream of a local branch
    pub fn upstream(&self, name: &str) -> Option<String> {
        self.state.lock().unwrap().upstreams.get(name).cloned()
    }

    /// Completed merges as `(source, target)`
    pub fn merges(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().merges.clone()
    }

    /// Commit messages, in order
    pub fn commits(&self) -> Vec<String> {
        self.state.lock().unwrap().commits.clone()
    }

    /// Pushed branch names, in order
    pub fn pushes(&self) -> Vec<String> {
        self.state.lock().unwrap().pushes.clone()
    }

    /// Whether a merge is still in progress
    pub fn is_merging(&self) -> bool {
        self.state.lock().unwrap().merging
    }

    // === Command interpretation ===

    fn status(s: &mut State) -> String {
        if !s.conflicts.is_empty() {
            match s.resolve_after {
                Some(0) => {
                    s.conflicts.clear();
                    s.resolve_after = None;
                    s.dirty = true;
                }
                Some(left) => s.resolve_after = Some(left - 1),
                None => {}
            }
        }
        let mut lines: Vec<String> = s.conflicts.iter().map(|f| format!("UU {f}")).collect();
        if s.dirty {
            lines.push(" M src/app.ts".to_string());
        }
        lines.join("\n")
    }

    fn switch_to(s: &mut State, args: &[&str], name: &str) -> Result<()> {
        if !s.conflicts.is_empty() {
            return Err(fail(
                args,
                "error: you need to resolve your current index first",
            ));
        }
        s.current = Some(name.to_string());
        Ok(())
    }

    /// Create `name` at `start` (local branch or `origin/<branch>`)
    fn create(s: &mut State, args: &[&str], name: &str, start: Option<&str>) -> Result<()> {
        if s.local.contains_key(name) {
            return Err(fail(
                args,
                format!("fatal: a branch named '{name}' already exists"),
            ));
        }
        let hash = match start {
            None => s.head_hash(),
            Some(start) => {
                if let Some(hash) = s.local.get(start) {
                    hash.clone()
                } else if let Some(hash) = start
                    .strip_prefix("origin/")
                    .and_then(|b| s.tracking.get(b))
                {
                    let hash = hash.clone();
                    s.upstreams.insert(name.to_string(), start.to_string());
                    hash
                } else {
                    return Err(fail(
                        args,
                        format!("fatal: '{start}' is not a commit and a branch '{name}' cannot be created from it"),
                    ));
                }
            }
        };
        s.local.insert(name.to_string(), hash);
        Ok(())
    }

    fn push(s: &mut State, args: &[&str], name: &str, set_upstream: bool) -> Result<String> {
        let Some(hash) = s.local.get(name).cloned() else {
            return Err(fail(args, format!("error: src refspec {name} does not match any")));
        };
        s.remote.insert(name.to_string(), hash.clone());
        s.tracking.insert(name.to_string(), hash);
        if set_upstream {
            s.upstreams
                .insert(name.to_string(), format!("{REMOTE}/{name}"));
        }
        s.pushes.push(name.to_string());
        Ok(String::new())
    }

    fn merge(s: &mut State, args: &[&str], source: &str) -> Result<String> {
        let Some(target) = s.current.clone() else {
            return Err(fail(args, "fatal: not on a branch"));
        };
        if !s.local.contains_key(source) {
            return Err(fail(args, format!("merge: {source} - not something we can merge")));
        }
        if let Some(files) = s.conflicts_on.get(&target).cloned() {
            s.merging = true;
            s.conflicts = files.clone();
            let report: Vec<String> = files
                .iter()
                .map(|f| format!("CONFLICT (content): Merge conflict in {f}"))
                .collect();
            return Err(Error::Vcs {
                command: args.join(" "),
                message: format!(
                    "{}\nAutomatic merge failed; fix conflicts and then commit the result.",
                    report.join("\n")
                ),
            });
        }
        let hash = s.hash();
        s.local.insert(target.clone(), hash);
        s.merges.push((source.to_string(), target));
        Ok(String::new())
    }

    fn interpret(s: &mut State, args: &[&str]) -> Result<String> {
        if !s.is_repo {
            return Err(fail(
                args,
                "fatal: not a git repository (or any of the parent directories): .git",
            ));
        }
        match args {
            ["rev-parse", "--is-inside-work-tree"] => Ok("true".to_string()),
            ["symbolic-ref", "--short", "HEAD"] => s
                .current
                .clone()
                .ok_or_else(|| fail(args, "fatal: ref HEAD is not a symbolic ref")),
            ["branch", "--list", _] => Ok(s
                .local
                .iter()
                .map(|(name, hash)| format!("{name}\t{hash}"))
                .collect::<Vec<_>>()
                .join("\n")),
            ["branch", "--remotes", _] => {
                let mut lines = vec![format!("{REMOTE}/HEAD\t0000000\trefs/remotes/{REMOTE}/main")];
                lines.extend(
                    s.tracking
                        .iter()
                        .map(|(name, hash)| format!("{REMOTE}/{name}\t{hash}\t")),
                );
                Ok(lines.join("\n"))
            }
            ["status", "--porcelain"] => Ok(Self::status(s)),
            ["diff", "--name-only", "--diff-filter=U"] => Ok(s.conflicts.join("\n")),
            ["ls-remote", "--heads", remote, name] => {
                if *remote != REMOTE {
                    return Err(fail(args, format!("fatal: '{remote}' does not appear to be a git repository")));
                }
                Ok(s
                    .remote
                    .get(*name)
                    .map(|hash| format!("{hash}\trefs/heads/{name}"))
                    .unwrap_or_default())
            }
            ["rev-parse", "--verify", "--quiet", "MERGE_HEAD"] => {
                if s.merging {
                    Ok(s.head_hash())
                } else {
                    Err(fail(args, ""))
                }
            }
            ["rev-parse", "--verify", "--quiet", refname] => refname
                .strip_prefix("refs/heads/")
                .and_then(|b| s.local.get(b))
                .cloned()
                .ok_or_else(|| fail(args, "")),
            ["rev-parse", "--abbrev-ref", spec] => spec
                .strip_suffix("@{upstream}")
                .and_then(|b| s.upstreams.get(b))
                .cloned()
                .ok_or_else(|| fail(args, "fatal: no upstream configured for branch")),
            ["config", "user.name"] => s.user_name.clone().ok_or_else(|| fail(args, "")),
            ["checkout", "-b", name] => {
                if !s.conflicts.is_empty() {
                    return Err(fail(args, "error: you need to resolve your current index first"));
                }
                Self::create(s, args, name, None)?;
                Self::switch_to(s, args, name)?;
                Ok(String::new())
            }
            ["checkout", "-b", name, start] => {
                if !s.conflicts.is_empty() {
                    return Err(fail(args, "error: you need to resolve your current index first"));
                }
                Self::create(s, args, name, Some(*start))?;
                Self::switch_to(s, args, name)?;
                Ok(String::new())
            }
            ["checkout", name] => {
                if !s.local.contains_key(*name) {
                    return Err(fail(
                        args,
                        format!("error: pathspec '{name}' did not match any file(s) known to git"),
                    ));
                }
                Self::switch_to(s, args, name)?;
                Ok(String::new())
            }
            ["branch", "--unset-upstream", name] => {
                if s.upstreams.remove(*name).is_none() {
                    return Err(fail(args, format!("fatal: branch '{name}' has no upstream information")));
                }
                Ok(String::new())
            }
            ["branch", flag, name] if flag.starts_with("--set-upstream-to=") => {
                let upstream = &flag["--set-upstream-to=".len()..];
                let exists = upstream
                    .strip_prefix("origin/")
                    .is_some_and(|b| s.tracking.contains_key(b));
                if !exists || !s.local.contains_key(*name) {
                    return Err(fail(
                        args,
                        format!("fatal: the requested upstream branch '{upstream}' does not exist"),
                    ));
                }
                s.upstreams.insert((*name).to_string(), upstream.to_string());
                Ok(String::new())
            }
            ["branch", name, start] => {
                Self::create(s, args, name, Some(*start))?;
                Ok(String::new())
            }
            ["pull", "--no-edit"] => {
                let has_upstream = s
                    .current
                    .as_ref()
                    .is_some_and(|b| s.upstreams.contains_key(b));
                let pull_conflicts = s
                    .current
                    .as_ref()
                    .and_then(|b| s.pull_conflicts_on.get(b))
                    .cloned();
                if let (true, Some(files)) = (has_upstream, pull_conflicts) {
                    s.merging = true;
                    s.conflicts = files.clone();
                    Err(fail(
                        args,
                        format!(
                            "CONFLICT (content): Merge conflict in {}\nAutomatic merge failed; fix conflicts and then commit the result.",
                            files.join(", ")
                        ),
                    ))
                } else if has_upstream {
                    Ok("Already up to date.".to_string())
                } else {
                    Err(fail(args, "There is no tracking information for the current branch."))
                }
            }
            ["fetch", remote, refspec] => {
                if *remote != REMOTE {
                    return Err(fail(args, format!("fatal: '{remote}' does not appear to be a git repository")));
                }
                let branch = refspec
                    .trim_start_matches('+')
                    .split(':')
                    .next()
                    .and_then(|src| src.strip_prefix("refs/heads/"))
                    .unwrap_or_default();
                let Some(hash) = s.remote.get(branch).cloned() else {
                    return Err(fail(args, format!("fatal: couldn't find remote ref refs/heads/{branch}")));
                };
                s.tracking.insert(branch.to_string(), hash);
                Ok(String::new())
            }
            ["push", "-u", _, name] => Self::push(s, args, name, true),
            ["push", _, name] => Self::push(s, args, name, false),
            ["merge", "--abort"] => {
                if !s.merging {
                    return Err(fail(args, "fatal: There is no merge to abort (MERGE_HEAD missing)."));
                }
                s.merging = false;
                s.conflicts.clear();
                s.resolve_after = None;
                s.dirty = false;
                Ok(String::new())
            }
            ["merge", "--no-edit", source] => Self::merge(s, args, source),
            ["add", "-A"] => Ok(String::new()),
            ["commit", "-m", message] => {
                if !s.conflicts.is_empty() {
                    return Err(fail(args, "error: Committing is not possible because you have unmerged files."));
                }
                if !s.dirty && !s.merging {
                    return Err(fail(args, "nothing to commit, working tree clean"));
                }
                s.dirty = false;
                s.merging = false;
                let hash = s.hash();
                if let Some(branch) = s.current.clone() {
                    s.local.insert(branch, hash);
                }
                s.commits.push((*message).to_string());
                Ok(String::new())
            }
            _ => Err(fail(args, "fake git does not understand this command")),
        }
    }
}

#[async_trait]
impl VcsExecutor for FakeGit {
    async fn run(&self, args: &[&str]) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        let command = args.join(" ");
        s.calls.push(command.clone());
        if let Some((_, message, successes)) = s
            .failures
            .iter_mut()
            .find(|(prefix, _, _)| command.starts_with(prefix.as_str()))
        {
            if *successes == 0 {
                return Err(Error::Vcs {
                    command,
                    message: message.clone(),
                });
            }
            *successes -= 1;
        }
        Self::interpret(&mut s, args)
    }
}
