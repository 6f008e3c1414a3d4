//! Command-line interface

pub mod branches;
pub mod context;
pub mod create;
pub mod merge;
pub mod settings;
pub mod style;

use anstream::println;
use async_trait::async_trait;
use branchflow::workflow::ProgressCallback;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use style::{Stylize, arrow};

/// Conventional branch names and guarded merges into shared branches
#[derive(Debug, Parser)]
#[command(name = "branchflow", version, about, long_about = None)]
pub struct Cli {
    /// Repository path (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub path: Option<PathBuf>,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log git commands and workflow phases to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a conventionally named branch
    Create,

    /// Merge the current feature branch into a target branch
    Merge,

    /// List branches in selection order
    Branches {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage merge targets
    Targets {
        /// Action
        #[command(subcommand)]
        action: TargetAction,
    },

    /// Manage branch prefixes
    Prefixes {
        /// Action
        #[command(subcommand)]
        action: PrefixAction,
    },

    /// Inspect the settings file
    Config {
        /// Action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `targets` actions
#[derive(Debug, Subcommand)]
pub enum TargetAction {
    /// Show configured targets
    List,
    /// Add a target
    Add {
        /// Branch name
        name: String,
        /// Label shown in the target picker
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Remove a target
    Remove {
        /// Branch name
        name: String,
    },
}

/// `prefixes` actions
#[derive(Debug, Subcommand)]
pub enum PrefixAction {
    /// Show configured prefixes
    List,
    /// Add a prefix
    Add {
        /// Prefix, e.g. `chore`
        prefix: String,
    },
    /// Remove a prefix
    Remove {
        /// Prefix
        prefix: String,
    },
}

/// `config` actions
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the settings file location
    Path,
    /// Print the effective settings as TOML
    Show,
}

/// Prints workflow status lines
#[derive(Debug, Clone, Copy, Default)]
pub struct CliProgress;

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        println!("{} {}", arrow(), message.muted());
    }
}
