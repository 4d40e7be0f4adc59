mod commands;
mod config;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use commands::{list, remove, rename, set, ListArgs, RemoveArgs, RenameArgs, SetArgs};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Survey logic - inspect and edit the conditional rules of a survey
#[derive(Parser, Debug)]
#[command(name = "survey-logic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./survey-logic.config.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the logic rules of a survey
    List(ListArgs),

    /// Rename a question everywhere it is referenced
    Rename(RenameArgs),

    /// Delete a logic rule
    Remove(RemoveArgs),

    /// Change the expression of a logic rule
    Set(SetArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();
    let config = Config::load(&cwd, cli.config.as_deref())?;

    match cli.command {
        Command::List(args) => list(args, &config),
        Command::Rename(args) => rename(args, &config),
        Command::Remove(args) => remove(args, &config),
        Command::Set(args) => set(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
