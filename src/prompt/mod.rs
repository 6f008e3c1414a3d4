//! User decision points
//!
//! Workflows ask for every decision through [`Prompter`]. Every method may
//! return `None`, meaning the user dismissed the prompt; workflows treat that
//! as a cancellation, never as an error.

mod terminal;

pub use terminal::TerminalPrompter;

use crate::error::Result;
use crate::types::ValidationResult;
use async_trait::async_trait;

/// Live validator for free-text input
pub type InputValidator<'a> = dyn Fn(&str) -> ValidationResult + Send + Sync + 'a;

/// Interactive prompting capability
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Pick one of `options`; returns its index
    async fn select(&self, prompt: &str, options: &[String]) -> Result<Option<usize>>;

    /// Ask for free text, re-asking until `validator` accepts it
    async fn input(
        &self,
        prompt: &str,
        placeholder: &str,
        validator: &InputValidator<'_>,
    ) -> Result<Option<String>>;

    /// Show `message` with a set of labelled choices; returns the chosen index
    async fn confirm(&self, message: &str, options: &[&str]) -> Result<Option<usize>>;

    /// Open a repository-relative file for the user to edit
    async fn open_file(&self, path: &str) -> Result<()>;
}
