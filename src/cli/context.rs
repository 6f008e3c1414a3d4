//! Shared command context for CLI commands
//!
//! Builds the git executor, terminal prompter and settings file shared by
//! the create, merge and branches commands.

use branchflow::config::{FileSettings, SettingsSource};
use branchflow::error::Result;
use branchflow::prompt::{Prompter, TerminalPrompter};
use branchflow::repo::Inspector;
use branchflow::vcs::{GitCli, VcsExecutor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared context for commands that talk to the repository
pub struct CommandContext {
    /// Working directory git runs in
    pub workdir: PathBuf,
    /// git executor
    pub vcs: Arc<dyn VcsExecutor>,
    /// Interactive prompts
    pub prompter: Arc<dyn Prompter>,
    /// Settings file
    pub settings: Arc<FileSettings>,
}

impl CommandContext {
    /// Create a context rooted at `path`, reading settings from `settings`
    pub fn new(path: &Path, settings: FileSettings) -> Self {
        let workdir = path.to_path_buf();
        Self {
            vcs: Arc::new(GitCli::new(&workdir)),
            prompter: Arc::new(TerminalPrompter::new(&workdir)),
            settings: Arc::new(settings),
            workdir,
        }
    }

    /// Settings as a shareable source
    pub fn settings_source(&self) -> Arc<dyn SettingsSource> {
        self.settings.clone()
    }

    /// Inspector for the configured remote
    pub fn inspector(&self) -> Result<Inspector> {
        let settings = self.settings.load()?;
        Ok(Inspector::new(Arc::clone(&self.vcs), settings.remote))
    }
}
