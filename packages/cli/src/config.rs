use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use survey_logic::{LogicOptions, Strings};

pub const DEFAULT_CONFIG_NAME: &str = "survey-logic.config.json";

/// Survey logic configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Logic editor options
    #[serde(default)]
    pub options: LogicOptions,

    /// Localized text overrides keyed by message id
    #[serde(default)]
    pub strings: HashMap<String, String>,
}

impl Config {
    /// Load config from `explicit`, or from the working directory if present
    pub fn load(cwd: &str, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else if explicit.is_some() {
            Err(anyhow::anyhow!("Config file not found: {}", config_path.display()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn text_formatter(&self) -> Strings {
        Strings::with_overrides(self.strings.clone())
    }
}
