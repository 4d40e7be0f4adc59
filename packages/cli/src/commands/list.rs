use super::open_logic;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use survey_logic::{LogicItem, SurveyLogic};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Survey JSON file
    pub input: PathBuf,

    /// Include system expressions that are not edited directly
    #[arg(short, long)]
    pub all: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RuleSummary {
    /// Position used by `remove` and `set`; system rules have none
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    name: String,
    expression: String,
    title: String,
    operations: Vec<OperationSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationSummary {
    logic_type: String,
    name: String,
    text: String,
}

pub fn list(args: ListArgs, config: &Config) -> Result<()> {
    let logic = open_logic(&args.input, config)?;

    let mut rules = summarize(&logic, logic.items(), true);
    if args.all {
        rules.extend(summarize(&logic, logic.invisible_items(), false));
    }

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    println!(
        "📋 {} {} ({} rules)",
        "Survey logic".green().bold(),
        args.input.display(),
        logic.items().len()
    );
    println!();

    for rule in &rules {
        match rule.index {
            Some(index) => println!("{:>3}. {}", index, rule.title.bold()),
            None => println!("{} {}", "  -".dimmed(), rule.title.dimmed()),
        }
        for operation in &rule.operations {
            println!("       {} {}: {}", "•".blue(), operation.name, operation.text);
        }
    }

    if rules.is_empty() {
        println!("   {} No logic rules found", "✓".green());
    }

    Ok(())
}

fn summarize(logic: &SurveyLogic, items: &[LogicItem], visible: bool) -> Vec<RuleSummary> {
    let strings = logic.strings();
    items
        .iter()
        .enumerate()
        .map(|(i, item)| RuleSummary {
            index: visible.then_some(i + 1),
            name: item.name(),
            expression: item.expression().to_string(),
            title: item.title(),
            operations: item
                .operations()
                .map(|operation| OperationSummary {
                    logic_type: operation.descriptor().name.to_string(),
                    name: operation.name(strings),
                    text: operation.text(logic.survey(), strings),
                })
                .collect(),
        })
        .collect()
}
