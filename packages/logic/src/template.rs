//! Type-specific edit payloads.
//!
//! Operations that create their own element carry a template the author
//! fills in (trigger parameters, thank-you page html). The template is copied
//! onto the element when the operation is saved.

use crate::item::rename_in_expression;
use serde_json::Value;
use std::collections::BTreeMap;
use survey_model::{is_value_empty, ElementId, ModelResult, Survey};

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateObject {
    Html(HtmlTemplate),
    Trigger(TriggerTemplate),
}

impl TemplateObject {
    pub fn has_error(&self) -> bool {
        match self {
            TemplateObject::Html(template) => template.has_error(),
            TemplateObject::Trigger(template) => template.has_error(),
        }
    }

    pub(crate) fn rename_question(&mut self, old_name: &str, new_name: &str) {
        if let TemplateObject::Trigger(template) = self {
            template.rename_question(old_name, new_name);
        }
    }
}

/// Body of a conditional "thank you page".
///
/// `html` is kept as stored: a plain string, or a localized object such as
/// `{"default": "...", "de": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HtmlTemplate {
    pub html: Value,
    pub read_only: bool,
}

impl HtmlTemplate {
    pub fn from_element(survey: &Survey, element: Option<ElementId>) -> Self {
        let html = element
            .and_then(|id| survey.element(id))
            .and_then(|item| item.property("html"))
            .cloned()
            .unwrap_or(Value::Null);
        Self {
            html,
            read_only: false,
        }
    }

    pub fn set_html(&mut self, html: impl Into<Value>) {
        self.html = html.into();
    }

    /// Text shown by default: the string itself or the `default` translation
    pub fn html_text(&self) -> Option<&str> {
        match &self.html {
            Value::String(text) => Some(text.as_str()),
            Value::Object(translations) => translations.get("default").and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn has_error(&self) -> bool {
        match &self.html {
            Value::String(text) => text.trim().is_empty(),
            Value::Object(translations) => !translations
                .values()
                .filter_map(Value::as_str)
                .any(|text| !text.trim().is_empty()),
            _ => true,
        }
    }

    pub fn apply_properties(&self, survey: &mut Survey, element: ElementId) -> ModelResult<()> {
        survey.set_value(element, "html", self.html.clone())
    }
}

struct TriggerFields {
    kind: &'static str,
    editable: &'static [&'static str],
    required: &'static [&'static str],
}

const TRIGGER_FIELDS: &[TriggerFields] = &[
    TriggerFields {
        kind: "setvaluetrigger",
        editable: &["setToName", "setValue", "isVariable"],
        required: &["setToName"],
    },
    TriggerFields {
        kind: "copyvaluetrigger",
        editable: &["setToName", "fromName"],
        required: &["setToName", "fromName"],
    },
    TriggerFields {
        kind: "skiptrigger",
        editable: &["gotoName"],
        required: &["gotoName"],
    },
    TriggerFields {
        kind: "runexpressiontrigger",
        editable: &["setToName", "runExpression"],
        required: &["runExpression"],
    },
];

/// Fields that hold question names
const NAME_FIELDS: &[&str] = &["setToName", "fromName", "gotoName"];

/// Fields that hold expressions referencing `{question}` markers
const EXPRESSION_FIELDS: &[&str] = &["runExpression"];

fn fields_of(kind: &str) -> Option<&'static TriggerFields> {
    TRIGGER_FIELDS.iter().find(|fields| fields.kind == kind)
}

/// Editable trigger parameters, keyed by property name
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerTemplate {
    kind: String,
    fields: BTreeMap<String, Value>,
}

impl TriggerTemplate {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            fields: BTreeMap::new(),
        }
    }

    /// Template pre-filled from an existing trigger
    pub fn from_element(survey: &Survey, kind: &str, element: Option<ElementId>) -> Self {
        let mut template = Self::new(kind);
        if let Some(trigger) = element.and_then(|id| survey.element(id)) {
            for &field in template.editable_fields() {
                if let Some(value) = trigger.property(field) {
                    template.fields.insert(field.to_string(), value.clone());
                }
            }
        }
        template
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn editable_fields(&self) -> &'static [&'static str] {
        fields_of(&self.kind).map(|f| f.editable).unwrap_or(&[])
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Set an editable field. Empty values clear it. Returns `false` for
    /// fields the trigger kind does not have.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> bool {
        if !self.editable_fields().contains(&name) {
            return false;
        }
        let value = value.into();
        if is_value_empty(&value) {
            self.fields.remove(name);
        } else {
            self.fields.insert(name.to_string(), value);
        }
        true
    }

    pub fn apply_properties(&self, survey: &mut Survey, element: ElementId) -> ModelResult<()> {
        for &field in self.editable_fields() {
            let value = self.fields.get(field).cloned().unwrap_or(Value::Null);
            survey.set_value(element, field, value)?;
        }
        Ok(())
    }

    /// A required field is missing
    pub fn has_error(&self) -> bool {
        let Some(fields) = fields_of(&self.kind) else {
            return false;
        };
        fields.required.iter().any(|&name| {
            self.fields
                .get(name)
                .map_or(true, is_value_empty)
        })
    }

    pub(crate) fn rename_question(&mut self, old_name: &str, new_name: &str) {
        let lower_old = old_name.to_lowercase();
        for &field in NAME_FIELDS {
            if let Some(Value::String(value)) = self.fields.get_mut(field) {
                if value.to_lowercase() == lower_old {
                    *value = new_name.to_string();
                }
            }
        }
        for &field in EXPRESSION_FIELDS {
            if let Some(Value::String(value)) = self.fields.get_mut(field) {
                *value = rename_in_expression(value, old_name, new_name);
            }
        }
    }
}
