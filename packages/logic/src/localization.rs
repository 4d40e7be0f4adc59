//! # Localized Texts
//!
//! Every user-facing string of the logic editor is looked up by id
//! (`question_visibilityName`, `trigger_setvalueText`, `noOperationError`, ...)
//! and may carry `{0}`, `{1}` placeholders filled by [`format_text`].

use std::collections::HashMap;

/// Text lookup and formatting service
pub trait TextFormatter {
    /// Text for a message id. Unknown ids come back verbatim.
    fn text(&self, id: &str) -> String;

    /// Replace `{0}`, `{1}`, ... in `template` with `args`
    fn format(&self, template: &str, args: &[&str]) -> String {
        format_text(template, args)
    }
}

/// Replace `{N}` placeholders with `args[N]`.
///
/// Placeholders without a matching argument are left as they are, and
/// substituted text is never rescanned.
pub fn format_text(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.find('}').map(|close| &after[..close]);

        match digits.and_then(|d| d.parse::<usize>().ok().map(|index| (d, index))) {
            Some((digits, index)) if index < args.len() => {
                result.push_str(args[index]);
                rest = &after[digits.len() + 1..];
            }
            _ => {
                result.push('{');
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

const ENGLISH: &[(&str, &str)] = &[
    ("page_visibilityName", "Page visibility"),
    (
        "page_visibilityDescription",
        "Make the page visible when the logic expression returns true. Otherwise keep it invisible.",
    ),
    ("page_visibilityText", "Make page {0} visible"),
    ("panel_visibilityName", "Panel visibility"),
    (
        "panel_visibilityDescription",
        "Make the panel visible when the logic expression returns true. Otherwise keep it invisible.",
    ),
    ("panel_visibilityText", "Make panel {0} visible"),
    ("panel_enableName", "Panel enable/disable"),
    (
        "panel_enableDescription",
        "Make the panel and all elements inside it enable when the logic expression returns true. Otherwise keep them disabled.",
    ),
    ("panel_enableText", "Make panel {0} enable"),
    ("question_visibilityName", "Question visibility"),
    (
        "question_visibilityDescription",
        "Make the question visible when the logic expression returns true. Otherwise keep it invisible.",
    ),
    ("question_visibilityText", "Make question {0} visible"),
    ("question_enableName", "Question enable/disable"),
    (
        "question_enableDescription",
        "Make the question enable when the logic expression returns true. Otherwise keep it disabled.",
    ),
    ("question_enableText", "Make question {0} enable"),
    ("question_requireName", "Question optional/required"),
    (
        "question_requireDescription",
        "Question becomes required when the logic expression returns true.",
    ),
    ("question_requireText", "Make question {0} required"),
    ("trigger_completeName", "Complete survey"),
    (
        "trigger_completeDescription",
        "When the logic expression returns true then the survey becomes completed and an end-user see the 'Thank you page'.",
    ),
    ("trigger_completeText", "Survey becomes completed"),
    ("trigger_setvalueName", "Set question value"),
    (
        "trigger_setvalueDescription",
        "When question values, that are used in the logic expression, are changed and the logic expression returns true, then the value is set to the selected question.",
    ),
    ("trigger_setvalueText", "Set into question: {0} value {1}"),
    ("trigger_copyvalueName", "Copy question value"),
    (
        "trigger_copyvalueDescription",
        "When question values, that are used in the logic expression, are changed and the logic expression returns true, then the value of one selected question is copied to another selected question.",
    ),
    ("trigger_copyvalueText", "Copy into question: {0} value from question {1}"),
    ("trigger_skipName", "Skip to question"),
    (
        "trigger_skipDescription",
        "When the logic expression returns true then the survey skip to / focus the selected question.",
    ),
    ("trigger_skipText", "Survey skip to the question {0}"),
    ("trigger_runExpressionName", "Run custom expression"),
    (
        "trigger_runExpressionDescription",
        "When the logic expression returns true, then the custom expression is performed. You may optionally set this expression result into the selected question.",
    ),
    ("trigger_runExpressionText1", "Run expression: '{0}'"),
    ("trigger_runExpressionText2", " and set its result into question: {0}"),
    ("completedHtmlOnConditionName", "Custom 'Thank you page' text"),
    (
        "completedHtmlOnConditionDescription",
        "If the logic expression returns true, then the default text for the 'Thank you page' is changed to the given one.",
    ),
    ("completedHtmlOnConditionText", "Show custom text for the 'Thank you page'."),
    ("itemExpressionText", "When expression: '{0}' returns true:"),
    ("expressionEditorTitle", "Setup the logic expression"),
    ("addNewOperation", "Add New Operation"),
    ("deleteOperation", "Delete Operation"),
    ("expressionInvalid", "The logic expression is empty or invalid. Please correct it."),
    ("noOperationError", "Please, add at least one operation."),
    ("operationInvalid", "Please, fix problems in your operation(s)."),
    ("edit", "Edit"),
    ("delete", "Delete"),
];

/// English texts with optional per-id overrides
#[derive(Debug, Clone, Default)]
pub struct Strings {
    overrides: HashMap<String, String>,
}

impl Strings {
    pub fn english() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }

    pub fn set(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.overrides.insert(id.into(), text.into());
    }
}

impl TextFormatter for Strings {
    fn text(&self, id: &str) -> String {
        if let Some(text) = self.overrides.get(id) {
            return text.clone();
        }
        ENGLISH
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, text)| text.to_string())
            .unwrap_or_else(|| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_positional_arguments() {
        assert_eq!(
            format_text("Set into question: {0} value {1}", &["{q1}", "5"]),
            "Set into question: {q1} value 5"
        );
    }

    #[test]
    fn test_format_keeps_unmatched_braces() {
        assert_eq!(format_text("{name} and {3} {0", &["x"]), "{name} and {3} {0");
        assert_eq!(format_text("{0}{0}", &["{0}"]), "{0}{0}");
    }

    #[test]
    fn test_unknown_id_is_returned_verbatim() {
        let strings = Strings::english();
        assert_eq!(strings.text("noSuchText"), "noSuchText");
        assert_eq!(strings.text("trigger_completeName"), "Complete survey");
    }

    #[test]
    fn test_overrides_win() {
        let mut strings = Strings::english();
        strings.set("trigger_completeName", "Finish");
        assert_eq!(strings.text("trigger_completeName"), "Finish");
    }
}
