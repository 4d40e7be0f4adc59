//! # Logic Type Catalog
//!
//! Static table of every place a survey can hold a conditional expression.
//!
//! Each [`LogicTypeDescriptor`] names an element class and the property on it
//! that carries the expression (`question` + `visibleIf`, `completetrigger` +
//! `expression`, ...), plus the policy the editor applies to it:
//!
//! - whether it is offered when authoring a new rule (`show_in_ui`, [`ShowIf`])
//! - whether at most one rule of the type may exist (`is_unique_item`)
//! - how a target element is obtained (picked from the survey, or created)
//! - how the bound element is described in the rule list ([`DisplayText`])
//!
//! Behaviour that differs per type is a closed set of variants dispatched by
//! `match`, so the table itself stays plain data.

use crate::errors::LogicResult;
use crate::localization::TextFormatter;
use crate::operation::LogicOperation;
use crate::template::{HtmlTemplate, TemplateObject, TriggerTemplate};
use survey_model::{ElementId, Survey};

/// Base classes containing this marker get the default trigger behaviour
pub const TRIGGER_MARKER: &str = "trigger";

pub const SELECTOR_TEMPLATE: &str = "elementselector";
pub const TRIGGER_TEMPLATE: &str = "propertyeditorcontent-trigger-content";
pub const HTML_TEMPLATE: &str = "propertyeditorcontent-html";

/// When a type is offered for a new rule.
///
/// Only gates the "add operation" offering; existing expressions are always
/// discovered by the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowIf {
    Always,
    /// More than one page, and some page without the property
    MultiplePagesWithout(&'static str),
    /// Some panel without the property
    AnyPanelWithout(&'static str),
    /// Some question without the property
    AnyQuestionWithout(&'static str),
}

impl ShowIf {
    pub fn evaluate(self, survey: &Survey) -> bool {
        match self {
            ShowIf::Always => true,
            ShowIf::MultiplePagesWithout(property) => {
                survey.pages().len() > 1 && any_without(survey, survey.pages(), property)
            }
            ShowIf::AnyPanelWithout(property) => {
                any_without(survey, &survey.all_panels(), property)
            }
            ShowIf::AnyQuestionWithout(property) => {
                any_without(survey, &survey.all_questions(), property)
            }
        }
    }
}

fn any_without(survey: &Survey, elements: &[ElementId], property: &str) -> bool {
    elements.iter().any(|&id| !survey.has_value(id, property))
}

/// Custom construction of a new target element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementFactory {
    HtmlConditionItem,
}

/// Custom persistence when an operation is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveHook {
    /// Copy the html body and attach the item to `completedHtmlOnCondition`
    CompletedHtmlOnCondition,
}

/// Custom edit payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateHook {
    HtmlEditor,
}

/// How the bound element is summarized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayText {
    /// `{name}` of the element itself
    ElementName,
    /// `{value}` of another name-holding property
    NameFrom(&'static str),
    /// Target question and the value being set
    SetValue,
    /// Target question and the source question
    CopyValue,
    /// The custom expression and its optional target question
    RunExpression,
}

/// Static description of one element-class/property pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicTypeDescriptor {
    /// Unique id, also the prefix of its localized texts
    pub name: &'static str,
    pub base_class: &'static str,
    pub property_name: &'static str,
    pub template_name: Option<&'static str>,
    pub show_in_ui: bool,
    pub is_unique_item: bool,
    /// Properties of the element that hold question names
    pub question_names: &'static [&'static str],
    pub show_if: ShowIf,
    pub element_factory: Option<ElementFactory>,
    pub save_hook: Option<SaveHook>,
    pub template_hook: Option<TemplateHook>,
    pub display: DisplayText,
}

impl LogicTypeDescriptor {
    pub const fn new(
        name: &'static str,
        base_class: &'static str,
        property_name: &'static str,
    ) -> Self {
        Self {
            name,
            base_class,
            property_name,
            template_name: None,
            show_in_ui: true,
            is_unique_item: false,
            question_names: &[],
            show_if: ShowIf::Always,
            element_factory: None,
            save_hook: None,
            template_hook: None,
            display: DisplayText::ElementName,
        }
    }

    /// System expression: discovered and renamed, never offered for editing
    pub const fn hidden(mut self) -> Self {
        self.show_in_ui = false;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.is_unique_item = true;
        self
    }

    pub const fn shown_if(mut self, show_if: ShowIf) -> Self {
        self.show_if = show_if;
        self
    }

    pub const fn with_question_names(mut self, names: &'static [&'static str]) -> Self {
        self.question_names = names;
        self
    }

    pub const fn with_display(mut self, display: DisplayText) -> Self {
        self.display = display;
        self
    }

    pub const fn with_template(mut self, name: &'static str, hook: TemplateHook) -> Self {
        self.template_name = Some(name);
        self.template_hook = Some(hook);
        self
    }

    pub const fn creating(mut self, factory: ElementFactory, save: SaveHook) -> Self {
        self.element_factory = Some(factory);
        self.save_hook = Some(save);
        self
    }

    pub fn is_trigger(&self) -> bool {
        self.base_class.contains(TRIGGER_MARKER)
    }

    pub fn can_create_new_element(&self) -> bool {
        self.element_factory.is_some() || self.is_trigger()
    }

    pub fn template_name(&self) -> &'static str {
        if self.is_trigger() {
            return TRIGGER_TEMPLATE;
        }
        self.template_name.unwrap_or(SELECTOR_TEMPLATE)
    }

    /// Whether the base class is one of the element's kinds
    pub fn matches(&self, kinds: &[&str]) -> bool {
        !self.base_class.is_empty() && kinds.contains(&self.base_class)
    }

    /// Fresh target element, or `None` when the author must pick one
    pub fn create_new_element(&self, survey: &mut Survey) -> LogicResult<Option<ElementId>> {
        let element = match self.element_factory {
            Some(ElementFactory::HtmlConditionItem) => survey.create_element("htmlconditionitem")?,
            None if self.is_trigger() => survey.create_element(self.base_class)?,
            None => return Ok(None),
        };
        Ok(Some(element))
    }

    /// Side effects of committing an operation
    pub fn save_element(&self, survey: &mut Survey, operation: &LogicOperation) -> LogicResult<()> {
        let Some(element) = operation.element() else {
            return Ok(());
        };

        if let Some(SaveHook::CompletedHtmlOnCondition) = self.save_hook {
            if let Some(TemplateObject::Html(template)) = operation.template_object() {
                template.apply_properties(survey, element)?;
            }
            if !survey.completed_html_on_condition().contains(&element) {
                survey.push_completed_html(element)?;
            }
        }

        if self.is_trigger() {
            if let Some(TemplateObject::Trigger(template)) = operation.template_object() {
                template.apply_properties(survey, element)?;
            }
            if !survey.triggers().contains(&element) && survey.has_value(element, "expression") {
                survey.push_trigger(element)?;
            }
        }

        Ok(())
    }

    pub fn create_template_object(
        &self,
        survey: &Survey,
        element: Option<ElementId>,
    ) -> Option<TemplateObject> {
        match self.template_hook {
            Some(TemplateHook::HtmlEditor) => {
                Some(TemplateObject::Html(HtmlTemplate::from_element(survey, element)))
            }
            None if self.is_trigger() => Some(TemplateObject::Trigger(TriggerTemplate::from_element(
                survey,
                self.base_class,
                element,
            ))),
            None => None,
        }
    }

    /// One-line summary of what the operation does to `element`
    pub fn display_text(
        &self,
        survey: &Survey,
        element: Option<ElementId>,
        strings: &dyn TextFormatter,
    ) -> String {
        let template = strings.text(&format!("{}Text", self.name));
        let field = |name: &str| {
            element
                .and_then(|id| survey.property_text(id, name))
                .unwrap_or_default()
        };

        match self.display {
            DisplayText::SetValue => strings.format(
                &template,
                &[&format_element_name(&field("setToName")), &field("setValue")],
            ),
            DisplayText::CopyValue => strings.format(
                &template,
                &[
                    &format_element_name(&field("setToName")),
                    &format_element_name(&field("fromName")),
                ],
            ),
            DisplayText::RunExpression => {
                let mut text = strings.format(
                    &strings.text("trigger_runExpressionText1"),
                    &[&field("runExpression")],
                );
                let set_to_name = field("setToName");
                if !set_to_name.is_empty() {
                    text.push_str(&strings.format(
                        &strings.text("trigger_runExpressionText2"),
                        &[&format_element_name(&set_to_name)],
                    ));
                }
                text
            }
            DisplayText::ElementName | DisplayText::NameFrom(_) => {
                let name = match self.display {
                    DisplayText::NameFrom(property) => field(property),
                    _ => field("name"),
                };
                if name.is_empty() {
                    template
                } else {
                    strings.format(&template, &[&format_element_name(&name)])
                }
            }
        }
    }
}

/// Field reference marker as written in expressions: `q1` → `{q1}`
pub fn format_element_name(name: &str) -> String {
    format!("{{{name}}}")
}

/// Built-in catalog
pub static LOGIC_TYPES: &[LogicTypeDescriptor] = &[
    LogicTypeDescriptor::new("page_visibility", "page", "visibleIf")
        .shown_if(ShowIf::MultiplePagesWithout("visibleIf")),
    LogicTypeDescriptor::new("panel_visibility", "panel", "visibleIf")
        .shown_if(ShowIf::AnyPanelWithout("visibleIf")),
    LogicTypeDescriptor::new("panel_enable", "panel", "enableIf")
        .shown_if(ShowIf::AnyPanelWithout("enableIf")),
    LogicTypeDescriptor::new("question_visibility", "question", "visibleIf")
        .shown_if(ShowIf::AnyQuestionWithout("visibleIf")),
    LogicTypeDescriptor::new("question_enable", "question", "enableIf")
        .shown_if(ShowIf::AnyQuestionWithout("enableIf")),
    LogicTypeDescriptor::new("question_require", "question", "requiredIf")
        .shown_if(ShowIf::AnyQuestionWithout("requiredIf")),
    LogicTypeDescriptor::new("expression_expression", "expression", "expression").hidden(),
    LogicTypeDescriptor::new(
        "matrixdropdowncolumn_visibleIf",
        "matrixdropdowncolumn",
        "visibleIf",
    )
    .hidden(),
    LogicTypeDescriptor::new(
        "matrixdropdowncolumn_enableIf",
        "matrixdropdowncolumn",
        "enableIf",
    )
    .hidden(),
    LogicTypeDescriptor::new(
        "matrixdropdowncolumn_requiredIf",
        "matrixdropdowncolumn",
        "requiredIf",
    )
    .hidden(),
    LogicTypeDescriptor::new(
        "matrixdropdowncolumn_totalExpression",
        "matrixdropdowncolumn",
        "totalExpression",
    )
    .hidden(),
    LogicTypeDescriptor::new("trigger_complete", "completetrigger", "expression").unique(),
    LogicTypeDescriptor::new("trigger_setvalue", "setvaluetrigger", "expression")
        .with_question_names(&["setToName"])
        .with_display(DisplayText::SetValue),
    LogicTypeDescriptor::new("trigger_copyvalue", "copyvaluetrigger", "expression")
        .with_question_names(&["setToName", "fromName"])
        .with_display(DisplayText::CopyValue),
    LogicTypeDescriptor::new("trigger_skip", "skiptrigger", "expression")
        .with_question_names(&["gotoName"])
        .unique()
        .with_display(DisplayText::NameFrom("gotoName")),
    LogicTypeDescriptor::new("trigger_runExpression", "runexpressiontrigger", "expression")
        .with_question_names(&["setToName"])
        .with_display(DisplayText::RunExpression),
    LogicTypeDescriptor::new("completedHtmlOnCondition", "htmlconditionitem", "expression")
        .unique()
        .with_template(HTML_TEMPLATE, TemplateHook::HtmlEditor)
        .creating(ElementFactory::HtmlConditionItem, SaveHook::CompletedHtmlOnCondition),
    LogicTypeDescriptor::new(
        "trigger_runExpression_Expression",
        "runexpressiontrigger",
        "runExpression",
    )
    .hidden(),
    LogicTypeDescriptor::new(
        "question_expressionValidator",
        "expressionvalidator",
        "expression",
    )
    .hidden(),
    LogicTypeDescriptor::new("matrix_rowsVisibleIf", "matrix", "rowsVisibleIf").hidden(),
    LogicTypeDescriptor::new("matrix_columnsVisibleIf", "matrix", "columnsVisibleIf").hidden(),
    LogicTypeDescriptor::new(
        "matrixdropdown_rowsVisibleIf",
        "matrixdropdown",
        "rowsVisibleIf",
    )
    .hidden(),
    LogicTypeDescriptor::new("select_choicesVisibleIf", "selectbase", "choicesVisibleIf").hidden(),
    LogicTypeDescriptor::new("select_choicesEnableIf", "selectbase", "choicesEnableIf").hidden(),
    LogicTypeDescriptor::new("itemvalue_visibleIf", "itemvalue", "visibleIf").hidden(),
    LogicTypeDescriptor::new("itemvalue_enableIf", "itemvalue", "enableIf").hidden(),
    LogicTypeDescriptor::new("calculatedValue", "calculatedvalue", "expression").hidden(),
];

/// Catalog entries whose base class is the element's kind or one of its ancestors
pub fn matching_types<'c>(
    survey: &Survey,
    element: ElementId,
    catalog: &'c [LogicTypeDescriptor],
) -> Vec<&'c LogicTypeDescriptor> {
    let kinds = survey.element_kinds(element);
    catalog.iter().filter(|d| d.matches(&kinds)).collect()
}

/// Matching entries whose property currently holds an expression on the element
pub fn bound_types<'c>(
    survey: &Survey,
    element: ElementId,
    catalog: &'c [LogicTypeDescriptor],
) -> Vec<&'c LogicTypeDescriptor> {
    matching_types(survey, element, catalog)
        .into_iter()
        .filter(|d| survey.has_value(element, d.property_name))
        .collect()
}
