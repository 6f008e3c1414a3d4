//! Branches command - list branches in the order the create picker shows them

use crate::cli::context::CommandContext;
use crate::cli::style::Stylize;
use anstream::println;
use branchflow::error::{Error, Result};
use branchflow::naming::sort_branches_for_selection;
use branchflow::types::GitBranchRef;

/// Run the branches command
pub async fn run_branches(ctx: &CommandContext, json: bool) -> Result<()> {
    let inspector = ctx.inspector()?;
    if !inspector.is_repository().await {
        return Err(Error::NotARepository(ctx.workdir.display().to_string()));
    }

    let mut branches = inspector.list_branches().await?;
    sort_branches_for_selection(&mut branches);

    if json {
        let out = serde_json::to_string_pretty(&branches)
            .map_err(|e| Error::Config(format!("failed to serialize branches: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    if branches.is_empty() {
        println!("{}", "No branches yet".muted());
        return Ok(());
    }
    for branch in &branches {
        print_branch(branch);
    }
    Ok(())
}

fn print_branch(branch: &GitBranchRef) {
    let marker = if branch.is_current { "*" } else { " " };
    let name = if branch.is_current {
        branch.name.emphasis()
    } else if branch.is_remote {
        branch.name.muted()
    } else {
        branch.name.accent()
    };
    println!("{marker} {name}  {}", branch.commit_hash.muted());
}
