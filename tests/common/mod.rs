//! Shared test utilities

#![allow(dead_code)]

pub mod fake_git;

pub use fake_git::FakeGit;
pub use mock_prompter::{Answer, AskedPrompt, MockPrompter, SelectGate};

use async_trait::async_trait;
use branchflow::config::{Settings, SettingsSource};
use branchflow::error::Result;
use branchflow::workflow::{BranchCreator, MergeOrchestrator, ProgressCallback};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Feature branch most workflow tests start on
pub const FEATURE: &str = "feature/20250101/login_alice";

/// Settings held in memory; edits are visible to the next `load`
#[derive(Default)]
pub struct MemorySettings {
    settings: Mutex<Settings>,
}

impl MemorySettings {
    /// Wrap settings
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }

    /// Edit the stored settings in place
    pub fn update(&self, edit: impl FnOnce(&mut Settings)) {
        edit(&mut self.settings.lock().unwrap());
    }
}

impl SettingsSource for MemorySettings {
    fn load(&self) -> Result<Settings> {
        Ok(self.settings.lock().unwrap().clone())
    }
}

/// Progress sink that keeps every message
#[derive(Default)]
pub struct RecordingProgress {
    messages: Mutex<Vec<String>>,
}

impl RecordingProgress {
    /// Messages received so far
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Everything a workflow test needs, wired together
pub struct Harness {
    pub git: Arc<FakeGit>,
    pub prompter: Arc<MockPrompter>,
    pub settings: Arc<MemorySettings>,
    pub progress: Arc<RecordingProgress>,
}

impl Harness {
    /// Harness over `git` answering from `answers`, with default settings
    pub fn new(git: FakeGit, answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            git: Arc::new(git),
            prompter: Arc::new(MockPrompter::new(answers)),
            settings: Arc::new(MemorySettings::default()),
            progress: Arc::new(RecordingProgress::default()),
        }
    }

    /// Merge orchestrator over this harness
    pub fn orchestrator(&self) -> MergeOrchestrator {
        MergeOrchestrator::new(
            self.git.clone(),
            self.prompter.clone(),
            self.settings.clone(),
            self.progress.clone(),
        )
    }

    /// Branch creator over this harness, dated 2025-01-02
    pub fn creator(&self) -> BranchCreator {
        BranchCreator::new(
            self.git.clone(),
            self.prompter.clone(),
            self.settings.clone(),
            self.progress.clone(),
        )
        .with_today(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap())
    }
}

/// Fake repository on [`FEATURE`], published and tracking, plus `uat` on the remote
pub fn feature_repo() -> FakeGit {
    let git = FakeGit::new();
    git.add_published(FEATURE);
    git.add_remote("uat");
    git.checkout_quietly(FEATURE);
    git
}

// =============================================================================
// Real git repositories
// =============================================================================

/// Run git in `dir`, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Working repository with a bare `origin`, one commit on `main`
pub struct TempGitRepo {
    _dir: TempDir,
    work: PathBuf,
    remote: PathBuf,
}

impl TempGitRepo {
    /// Create the pair and push `main`
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let work = dir.path().join("work");
        let remote = dir.path().join("origin.git");
        std::fs::create_dir_all(&work).unwrap();

        git(dir.path(), &["init", "--bare", "-b", "main", "origin.git"]);
        git(&work, &["init", "-b", "main"]);
        git(&work, &["config", "user.name", "Test User"]);
        git(&work, &["config", "user.email", "test@example.com"]);
        git(&work, &["config", "commit.gpgsign", "false"]);
        git(
            &work,
            &["remote", "add", "origin", remote.to_str().unwrap()],
        );
        std::fs::write(work.join("README.md"), "# test\n").unwrap();
        git(&work, &["add", "-A"]);
        git(&work, &["commit", "-m", "initial"]);
        git(&work, &["push", "-u", "origin", "main"]);

        Self {
            _dir: dir,
            work,
            remote,
        }
    }

    /// Working tree path
    pub fn path(&self) -> &Path {
        &self.work
    }

    /// Bare remote path
    pub fn remote_path(&self) -> &Path {
        &self.remote
    }

    /// Run git in the working tree
    pub fn git(&self, args: &[&str]) -> String {
        git(&self.work, args)
    }

    /// Write a file and commit it on the current branch
    pub fn commit_file(&self, name: &str, content: &str, message: &str) {
        std::fs::write(self.work.join(name), content).unwrap();
        self.git(&["add", "-A"]);
        self.git(&["commit", "-m", message]);
    }
}
