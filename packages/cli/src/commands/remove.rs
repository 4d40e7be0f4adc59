use super::{item_at, open_logic, write_survey};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Survey JSON file
    pub input: PathBuf,

    /// Rule number as shown by `list`
    pub index: usize,

    /// Write the survey here instead of over the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Delete a rule, clearing its expression everywhere it is used
pub fn remove(args: RemoveArgs, config: &Config) -> Result<()> {
    let mut logic = open_logic(&args.input, config)?;

    let id = item_at(&logic, args.index)?;
    let expression = logic
        .item(id)
        .map(|item| item.title())
        .unwrap_or_default();
    logic.remove_item(id)?;

    write_survey(&logic, &args.input, args.output.as_deref())?;

    println!("{} Removed rule #{}: {}", "✓".green(), args.index, expression.dimmed());
    Ok(())
}
