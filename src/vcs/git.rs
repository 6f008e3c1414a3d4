//! `git` binary executor

use crate::error::{Error, Result};
use crate::vcs::VcsExecutor;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Executor that shells out to the `git` CLI
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
    workdir: PathBuf,
}

impl GitCli {
    /// Run `git` from `PATH` inside `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            binary: "git".to_string(),
            workdir: workdir.into(),
        }
    }

    /// Use a specific git binary
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Working directory commands run in
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

/// Pick the most useful failure text from a finished process
fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if stdout.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stdout.to_string()
    }
}

#[async_trait]
impl VcsExecutor for GitCli {
    async fn run(&self, args: &[&str]) -> Result<String> {
        let command = args.join(" ");
        debug!(cwd = %self.workdir.display(), "git {command}");

        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::Vcs {
                command: command.clone(),
                message: format!("failed to run {}: {e}", self.binary),
            })?;

        if !output.status.success() {
            let message = failure_message(&output);
            debug!(%message, "git {command} failed");
            return Err(Error::Vcs { command, message });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
