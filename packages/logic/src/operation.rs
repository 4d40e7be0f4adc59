//! A single action of a logic rule bound to one survey element.

use crate::catalog::LogicTypeDescriptor;
use crate::errors::{LogicError, LogicResult};
use crate::localization::TextFormatter;
use crate::logic_type::{LogicType, LogicTypeId};
use crate::selector::ElementSelector;
use crate::template::TemplateObject;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use survey_model::{ElementId, Survey};

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique operation identifier, increasing in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OperationId(u64);

impl OperationId {
    fn next() -> Self {
        Self(NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicOperation {
    id: OperationId,
    logic_type: LogicTypeId,
    descriptor: &'static LogicTypeDescriptor,
    element: Option<ElementId>,
    item_selector: Option<ElementSelector>,
    template_object: Option<TemplateObject>,
}

impl LogicOperation {
    pub fn new(logic_type: &LogicType, element: Option<ElementId>, survey: &Survey) -> Self {
        let mut item_selector = logic_type.create_item_selector();
        if let Some(selector) = item_selector.as_mut() {
            selector.set_element(element);
        }
        let template_object = logic_type.create_template_object(survey, element);

        Self {
            id: OperationId::next(),
            logic_type: logic_type.id(),
            descriptor: logic_type.descriptor(),
            element: if item_selector.is_some() { None } else { element },
            item_selector,
            template_object,
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn logic_type(&self) -> LogicTypeId {
        self.logic_type
    }

    pub fn descriptor(&self) -> &'static LogicTypeDescriptor {
        self.descriptor
    }

    pub fn template_name(&self) -> &'static str {
        self.descriptor.template_name()
    }

    /// Target element: the picker's selection when there is a picker
    pub fn element(&self) -> Option<ElementId> {
        match &self.item_selector {
            Some(selector) => selector.element(),
            None => self.element,
        }
    }

    pub fn item_selector(&self) -> Option<&ElementSelector> {
        self.item_selector.as_ref()
    }

    pub fn template_object(&self) -> Option<&TemplateObject> {
        self.template_object.as_ref()
    }

    pub fn template_object_mut(&mut self) -> Option<&mut TemplateObject> {
        self.template_object.as_mut()
    }

    /// Point the picker at another element, or clear it with `None`.
    ///
    /// Elements already holding an expression in the bound property are
    /// rejected unless they are the current selection.
    pub fn select_element(
        &mut self,
        survey: &Survey,
        element: Option<ElementId>,
    ) -> LogicResult<()> {
        let base_class = self.descriptor.base_class;
        let Some(selector) = self.item_selector.as_mut() else {
            return Err(LogicError::NoItemSelector(self.descriptor.name));
        };
        if let Some(id) = element {
            if !survey.is_kind(id, base_class) {
                return Err(LogicError::ElementNotApplicable { element: id, base_class });
            }
            let property = selector.disabled_property_name();
            if selector.element() != Some(id) && survey.has_value(id, property) {
                return Err(LogicError::ElementAlreadyBound { element: id, property });
            }
        }
        selector.set_element(element);
        Ok(())
    }

    /// Write `expression` into the bound property.
    ///
    /// Renames only rewrite the text; otherwise the type's save hook runs too.
    pub fn apply(
        &self,
        survey: &mut Survey,
        expression: &str,
        is_renaming: bool,
    ) -> LogicResult<()> {
        let Some(element) = self.element() else {
            return Ok(());
        };
        survey.set_property(element, self.descriptor.property_name, expression)?;
        if !is_renaming {
            self.descriptor.save_element(survey, self)?;
        }
        Ok(())
    }

    /// Replace `old_name` in the element's question-name properties
    pub fn rename_question(
        &mut self,
        survey: &mut Survey,
        old_name: &str,
        new_name: &str,
    ) -> LogicResult<()> {
        if let Some(template) = self.template_object.as_mut() {
            template.rename_question(old_name, new_name);
        }
        let Some(element) = self.element() else {
            return Ok(());
        };

        let old_name = old_name.to_lowercase();
        for &property in self.descriptor.question_names {
            let matches = survey
                .property_str(element, property)
                .is_some_and(|value| value.to_lowercase() == old_name);
            if matches {
                survey.set_property(element, property, new_name)?;
            }
        }
        Ok(())
    }

    /// Same type targeting the same element
    pub fn equals(&self, other: &LogicOperation) -> bool {
        self.logic_type == other.logic_type && self.element() == other.element()
    }

    pub fn has_error(&self) -> bool {
        if let Some(selector) = &self.item_selector {
            return selector.has_error();
        }
        self.template_object
            .as_ref()
            .is_some_and(TemplateObject::has_error)
    }

    pub fn name(&self, strings: &dyn TextFormatter) -> String {
        strings.text(&format!("{}Name", self.descriptor.name))
    }

    pub fn text(&self, survey: &Survey, strings: &dyn TextFormatter) -> String {
        self.descriptor.display_text(survey, self.element(), strings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LOGIC_TYPES;
    use crate::options::LogicOptions;
    use crate::template::TriggerTemplate;

    fn logic_type(name: &str, survey: &Survey) -> LogicType {
        let index = LOGIC_TYPES.iter().position(|d| d.name == name).unwrap();
        LogicType::new(
            LogicTypeId::from_index(index),
            &LOGIC_TYPES[index],
            survey,
            &LogicOptions::default(),
        )
    }

    #[test]
    fn test_ids_increase() {
        let survey = Survey::new();
        let complete = logic_type("trigger_complete", &survey);
        let first = LogicOperation::new(&complete, None, &survey);
        let second = LogicOperation::new(&complete, None, &survey);
        assert!(first.id() < second.id());
    }

    #[test]
    fn test_selector_rejects_wrong_kind() {
        let mut survey = Survey::new();
        let page = survey.add_page("page1");
        let q1 = survey.add_question(page, "text", "q1").unwrap();

        let visibility = logic_type("question_visibility", &survey);
        let mut operation = LogicOperation::new(&visibility, None, &survey);
        assert!(operation.has_error());

        let err = operation.select_element(&survey, Some(page)).unwrap_err();
        assert!(matches!(err, LogicError::ElementNotApplicable { .. }));

        operation.select_element(&survey, Some(q1)).unwrap();
        assert_eq!(operation.element(), Some(q1));
        assert!(!operation.has_error());
    }

    #[test]
    fn test_selector_rejects_bound_element() {
        let mut survey = Survey::new();
        let page = survey.add_page("page1");
        let q1 = survey.add_question(page, "text", "q1").unwrap();
        let q2 = survey.add_question(page, "text", "q2").unwrap();
        survey.set_property(q2, "visibleIf", "{q1} = 1").unwrap();
        let visibility = logic_type("question_visibility", &survey);

        let mut operation = LogicOperation::new(&visibility, None, &survey);
        let err = operation.select_element(&survey, Some(q2)).unwrap_err();
        assert!(matches!(
            err,
            LogicError::ElementAlreadyBound { element, property: "visibleIf" } if element == q2
        ));
        assert_eq!(operation.element(), None);

        operation.select_element(&survey, Some(q1)).unwrap();
        assert_eq!(operation.element(), Some(q1));

        let mut existing = LogicOperation::new(&visibility, Some(q2), &survey);
        existing.select_element(&survey, Some(q2)).unwrap();
        assert_eq!(existing.element(), Some(q2));
    }

    #[test]
    fn test_apply_writes_and_saves_trigger() {
        let mut survey = Survey::new();
        let skip = logic_type("trigger_skip", &survey);
        let trigger = skip.create_new_element(&mut survey).unwrap();
        let mut operation = LogicOperation::new(&skip, trigger, &survey);

        if let Some(TemplateObject::Trigger(template)) = operation.template_object_mut() {
            template.set_field("gotoName", "q3");
        }
        assert!(!operation.has_error());

        operation.apply(&mut survey, "{q1} = 2", true).unwrap();
        assert!(survey.triggers().is_empty());

        operation.apply(&mut survey, "{q1} = 2", false).unwrap();
        let trigger = trigger.unwrap();
        assert_eq!(survey.triggers(), &[trigger]);
        assert_eq!(survey.property_str(trigger, "gotoName"), Some("q3"));
        assert_eq!(survey.property_str(trigger, "expression"), Some("{q1} = 2"));
    }

    #[test]
    fn test_rename_updates_element_and_template() {
        let mut survey = Survey::new();
        let copy = logic_type("trigger_copyvalue", &survey);
        let trigger = survey.create_element("copyvaluetrigger").unwrap();
        survey.set_property(trigger, "setToName", "Q1").unwrap();
        survey.set_property(trigger, "fromName", "q2").unwrap();

        let mut operation = LogicOperation::new(&copy, Some(trigger), &survey);
        operation.rename_question(&mut survey, "q1", "age").unwrap();

        assert_eq!(survey.property_str(trigger, "setToName"), Some("age"));
        assert_eq!(survey.property_str(trigger, "fromName"), Some("q2"));
        let Some(TemplateObject::Trigger(template)) = operation.template_object() else {
            panic!("copy value operations carry a trigger template");
        };
        assert_eq!(template.field_str("setToName"), Some("age"));
        assert_ne!(template, &TriggerTemplate::new("copyvaluetrigger"));
    }

    #[test]
    fn test_equals_compares_type_and_element() {
        let mut survey = Survey::new();
        let page = survey.add_page("page1");
        let q1 = survey.add_question(page, "text", "q1").unwrap();
        let q2 = survey.add_question(page, "text", "q2").unwrap();
        let visibility = logic_type("question_visibility", &survey);
        let enable = logic_type("question_enable", &survey);

        let a = LogicOperation::new(&visibility, Some(q1), &survey);
        let b = LogicOperation::new(&visibility, Some(q1), &survey);
        let c = LogicOperation::new(&visibility, Some(q2), &survey);
        let d = LogicOperation::new(&enable, Some(q1), &survey);

        assert!(a.equals(&b));
        assert!(!a.equals(&c));
        assert!(!a.equals(&d));
    }
}
