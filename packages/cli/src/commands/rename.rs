use super::{open_logic, write_survey};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use survey_logic::rename_in_expression;

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Survey JSON file
    pub input: PathBuf,

    /// Current question name (case-insensitive)
    pub old_name: String,

    /// New question name
    pub new_name: String,

    /// Write the survey here instead of over the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Rename a question and every reference to it in the survey logic
pub fn rename(args: RenameArgs, config: &Config) -> Result<()> {
    let mut logic = open_logic(&args.input, config)?;

    let question = logic
        .survey()
        .find_question(&args.old_name)
        .ok_or_else(|| anyhow::anyhow!("Question not found: {}", args.old_name))?;

    let changed = logic
        .items()
        .iter()
        .chain(logic.invisible_items())
        .filter(|item| {
            rename_in_expression(item.expression(), &args.old_name, &args.new_name)
                != item.expression()
        })
        .count();

    logic.rename_question(&args.old_name, &args.new_name)?;
    logic.survey_mut().set_property(question, "name", &args.new_name)?;

    write_survey(&logic, &args.input, args.output.as_deref())?;

    println!(
        "{} Renamed question {} → {} ({} rules updated)",
        "✓".green(),
        args.old_name.bold(),
        args.new_name.bold(),
        changed
    );
    Ok(())
}
