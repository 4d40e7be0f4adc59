use super::{item_at, open_logic, write_survey};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Survey JSON file
    pub input: PathBuf,

    /// Rule number as shown by `list`
    pub index: usize,

    /// New logic expression
    pub expression: String,

    /// Write the survey here instead of over the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Replace the expression of a rule on every element it drives
pub fn set(args: SetArgs, config: &Config) -> Result<()> {
    let mut logic = open_logic(&args.input, config)?;

    let id = item_at(&logic, args.index)?;
    logic.edit_item(id)?;
    logic.set_editing_expression(args.expression.as_str());
    if !logic.save_editable_item() {
        return Err(anyhow::anyhow!("{}", logic.error_text()));
    }

    write_survey(&logic, &args.input, args.output.as_deref())?;

    println!(
        "{} Rule #{} now reads {}",
        "✓".green(),
        args.index,
        args.expression.bold()
    );
    Ok(())
}
