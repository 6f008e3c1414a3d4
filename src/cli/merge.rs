//! Merge command - merge the current feature branch into a target

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, Stylize};
use anstream::println;
use branchflow::error::Result;
use branchflow::workflow::{MergeOrchestrator, MergeOutcome};
use std::sync::Arc;

/// Run the merge command
pub async fn run_merge(ctx: &CommandContext) -> Result<()> {
    let orchestrator = MergeOrchestrator::new(
        Arc::clone(&ctx.vcs),
        Arc::clone(&ctx.prompter),
        ctx.settings_source(),
        Arc::new(CliProgress),
    );

    match orchestrator.merge_into_target().await? {
        MergeOutcome::Completed { source, target } => {
            println!(
                "{} {} into {}, back on {}",
                format!("{CHECK} Merged").success(),
                source.accent(),
                target.accent(),
                source.accent()
            );
        }
        MergeOutcome::AwaitingResolution {
            source,
            target,
            file,
        } => {
            println!(
                "{} Merge of {} into {} is waiting on conflicts in {}",
                "⚠".warn(),
                source.accent(),
                target.accent(),
                file.emphasis()
            );
            println!(
                "   {}",
                format!(
                    "Finish with 'git add' + 'git commit' and 'git push', or 'git merge --abort'; then 'git checkout {source}'."
                )
                .muted()
            );
        }
        MergeOutcome::Cancelled => println!("{}", "Cancelled".muted()),
    }
    Ok(())
}
