//! Editor options

use serde::{Deserialize, Serialize};

/// Options for the logic editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogicOptions {
    /// Rules can be inspected but not added, edited or removed
    pub read_only: bool,

    /// Element pickers label elements by title instead of name
    pub show_titles_in_expressions: bool,
}
