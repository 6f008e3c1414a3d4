//! dialoguer-backed prompts

use crate::error::{Error, Result};
use crate::prompt::{InputValidator, Prompter};
use anstream::println;
use async_trait::async_trait;
use dialoguer::{Input, Select};
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Prompts rendered on the controlling terminal
///
/// dialoguer blocks, so each prompt runs under `block_in_place`; this needs
/// the multi-threaded tokio runtime.
#[derive(Debug, Clone)]
pub struct TerminalPrompter {
    workdir: PathBuf,
}

impl TerminalPrompter {
    /// Prompter that opens files relative to `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Prompt(e.to_string())
}

/// `$VISUAL`, then `$EDITOR`, split into program and arguments
fn editor_command() -> Option<Vec<String>> {
    ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|cmd| cmd.split_whitespace().map(String::from).collect::<Vec<_>>())
        .find(|parts| !parts.is_empty())
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn select(&self, prompt: &str, options: &[String]) -> Result<Option<usize>> {
        tokio::task::block_in_place(|| {
            Select::new()
                .with_prompt(prompt)
                .items(options)
                .default(0)
                .interact_opt()
                .map_err(prompt_error)
        })
    }

    async fn input(
        &self,
        prompt: &str,
        placeholder: &str,
        validator: &InputValidator<'_>,
    ) -> Result<Option<String>> {
        let label = if placeholder.is_empty() {
            prompt.to_string()
        } else {
            format!("{prompt} (e.g. {placeholder}, empty to cancel)")
        };
        let text = tokio::task::block_in_place(|| {
            Input::<String>::new()
                .with_prompt(label)
                .allow_empty(true)
                .validate_with(|value: &String| -> std::result::Result<(), String> {
                    if value.trim().is_empty() {
                        return Ok(());
                    }
                    validator(value.trim()).into_result()
                })
                .interact_text()
                .map_err(prompt_error)
        })?;
        let text = text.trim().to_string();
        Ok((!text.is_empty()).then_some(text))
    }

    async fn confirm(&self, message: &str, options: &[&str]) -> Result<Option<usize>> {
        tokio::task::block_in_place(|| {
            Select::new()
                .with_prompt(message)
                .items(options)
                .default(0)
                .interact_opt()
                .map_err(prompt_error)
        })
    }

    async fn open_file(&self, path: &str) -> Result<()> {
        let full = self.workdir.join(path);
        let Some(parts) = editor_command() else {
            println!("Open {} to resolve the conflict.", full.display());
            return Ok(());
        };
        debug!(editor = %parts[0], file = %full.display(), "opening editor");
        let status = Command::new(&parts[0])
            .args(&parts[1..])
            .arg(&full)
            .status()
            .await?;
        if !status.success() {
            return Err(Error::Prompt(format!("editor exited with {status}")));
        }
        Ok(())
    }
}
