//! Create command - interactive conventional branch creation

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use branchflow::error::Result;
use branchflow::workflow::{BranchCreator, CreateOutcome};
use std::sync::Arc;

/// Run the create command
pub async fn run_create(ctx: &CommandContext) -> Result<()> {
    let creator = BranchCreator::new(
        Arc::clone(&ctx.vcs),
        Arc::clone(&ctx.prompter),
        ctx.settings_source(),
        Arc::new(CliProgress),
    );

    match creator.create_branch().await? {
        CreateOutcome::Created {
            name,
            base,
            checked_out,
        } => {
            println!(
                "{} Created {} from {}",
                check(),
                name.accent(),
                base.muted()
            );
            if !checked_out {
                println!(
                    "{}",
                    format!("Still on the previous branch. Run 'git checkout {name}' to switch.")
                        .muted()
                );
            }
        }
        CreateOutcome::CheckedOutExisting { name } => {
            println!("{} Checked out existing {}", check(), name.accent());
        }
        CreateOutcome::Cancelled => println!("{}", "Cancelled".muted()),
    }
    Ok(())
}
