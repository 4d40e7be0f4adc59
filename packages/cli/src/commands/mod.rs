pub mod list;
pub mod remove;
pub mod rename;
pub mod set;

pub use list::{list, ListArgs};
pub use remove::{remove, RemoveArgs};
pub use rename::{rename, RenameArgs};
pub use set::{set, SetArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use survey_logic::{ItemId, SurveyLogic};
use survey_model::Survey;
use tracing::info;

/// Load a survey file into a logic session configured from `config`
pub(crate) fn open_logic(input: &Path, config: &Config) -> Result<SurveyLogic> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("Cannot read survey {}", input.display()))?;
    let survey = Survey::from_json(&source)
        .with_context(|| format!("Invalid survey {}", input.display()))?;

    let mut logic = SurveyLogic::new(survey, config.options.clone());
    logic.set_text_formatter(config.text_formatter());
    Ok(logic)
}

/// Write the survey back to `output`, or over `input`
pub(crate) fn write_survey(logic: &SurveyLogic, input: &Path, output: Option<&Path>) -> Result<()> {
    let path = output.unwrap_or(input);
    let mut json = logic.survey().to_json_pretty()?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("Cannot write survey {}", path.display()))?;
    info!(path = %path.display(), "Wrote survey");
    Ok(())
}

/// Rule id for a 1-based position in the visible rule list
pub(crate) fn item_at(logic: &SurveyLogic, index: usize) -> Result<ItemId> {
    index
        .checked_sub(1)
        .and_then(|i| logic.items().get(i))
        .map(|item| item.id())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No rule #{} (the survey has {} rules)",
                index,
                logic.items().len()
            )
        })
}
