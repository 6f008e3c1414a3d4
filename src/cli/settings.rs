//! Settings commands - targets, prefixes and config

use crate::cli::style::{Stylize, arrow, check};
use crate::cli::{ConfigAction, PrefixAction, TargetAction};
use anstream::{print, println};
use branchflow::config::{FileSettings, SettingsSource};
use branchflow::error::{Error, Result};
use branchflow::types::TargetBranchConfig;

/// Run a `targets` action
pub fn run_targets(store: &FileSettings, action: TargetAction) -> Result<()> {
    let mut settings = store.load()?;
    match action {
        TargetAction::List => {
            println!("{}:", "Merge targets".emphasis());
            for target in &settings.target_branches {
                if target.description.is_empty() {
                    println!("  {} {}", arrow(), target.name.accent());
                } else {
                    println!(
                        "  {} {}  {}",
                        arrow(),
                        target.name.accent(),
                        target.description.muted()
                    );
                }
            }
        }
        TargetAction::Add { name, description } => {
            settings.add_target_branch(TargetBranchConfig::new(name.clone(), description))?;
            store.save(&settings)?;
            println!("{} Added target {}", check(), name.accent());
        }
        TargetAction::Remove { name } => {
            let removed = settings.remove_target_branch(&name)?;
            store.save(&settings)?;
            println!("{} Removed target {}", check(), removed.name.accent());
        }
    }
    Ok(())
}

/// Run a `prefixes` action
pub fn run_prefixes(store: &FileSettings, action: PrefixAction) -> Result<()> {
    let mut settings = store.load()?;
    match action {
        PrefixAction::List => {
            println!("{}:", "Branch prefixes".emphasis());
            for prefix in &settings.branch_prefixes {
                println!("  {} {}", arrow(), prefix.accent());
            }
        }
        PrefixAction::Add { prefix } => {
            settings.add_prefix(&prefix)?;
            store.save(&settings)?;
            println!("{} Added prefix {}", check(), prefix.accent());
        }
        PrefixAction::Remove { prefix } => {
            settings.remove_prefix(&prefix)?;
            store.save(&settings)?;
            println!("{} Removed prefix {}", check(), prefix.accent());
        }
    }
    Ok(())
}

/// Run a `config` action
pub fn run_config(store: &FileSettings, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => println!("{}", store.path().display()),
        ConfigAction::Show => {
            let settings = store.load()?;
            let content = toml::to_string_pretty(&settings)
                .map_err(|e| Error::Config(format!("failed to serialize settings: {e}")))?;
            print!("{content}");
        }
    }
    Ok(())
}
