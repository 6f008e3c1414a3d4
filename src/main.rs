//! branchflow CLI

mod cli;

use anstream::eprintln;
use branchflow::config::FileSettings;
use branchflow::error::Result;
use clap::Parser;
use cli::context::CommandContext;
use cli::style::{CROSS, Stylize};
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "branchflow=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let path = match cli.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let store = cli
        .config
        .map_or_else(FileSettings::at_default_location, FileSettings::new);

    match cli.command {
        Commands::Create => cli::create::run_create(&CommandContext::new(&path, store)).await,
        Commands::Merge => cli::merge::run_merge(&CommandContext::new(&path, store)).await,
        Commands::Branches { json } => {
            cli::branches::run_branches(&CommandContext::new(&path, store), json).await
        }
        Commands::Targets { action } => cli::settings::run_targets(&store, action),
        Commands::Prefixes { action } => cli::settings::run_prefixes(&store, action),
        Commands::Config { action } => cli::settings::run_config(&store, action),
    }
}

// dialoguer prompts run under block_in_place, which needs worker threads
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_cancellation() => {
            eprintln!("{}", "Cancelled".muted());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {e}", format!("{CROSS} Error:").error());
            ExitCode::FAILURE
        }
    }
}
