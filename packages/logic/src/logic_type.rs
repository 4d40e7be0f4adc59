//! Runtime state of a catalog entry within one editing session.

use crate::catalog::{format_element_name, LogicTypeDescriptor};
use crate::errors::LogicResult;
use crate::localization::TextFormatter;
use crate::operation::LogicOperation;
use crate::options::LogicOptions;
use crate::selector::ElementSelector;
use crate::template::TemplateObject;
use serde::Serialize;
use std::fmt;
use survey_model::{ElementId, Survey};

/// Position of a logic type in its session's type list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LogicTypeId(usize);

impl LogicTypeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LogicTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type{}", self.0)
    }
}

/// A catalog entry plus the visibility computed against the current document
#[derive(Debug, Clone)]
pub struct LogicType {
    id: LogicTypeId,
    descriptor: &'static LogicTypeDescriptor,
    show_titles: bool,
    has_unique_item: bool,
    visible: bool,
}

impl LogicType {
    pub fn new(
        id: LogicTypeId,
        descriptor: &'static LogicTypeDescriptor,
        survey: &Survey,
        options: &LogicOptions,
    ) -> Self {
        let mut logic_type = Self {
            id,
            descriptor,
            show_titles: options.show_titles_in_expressions,
            has_unique_item: false,
            visible: true,
        };
        logic_type.update(survey, std::iter::empty::<&LogicOperation>());
        logic_type
    }

    pub fn id(&self) -> LogicTypeId {
        self.id
    }

    pub fn descriptor(&self) -> &'static LogicTypeDescriptor {
        self.descriptor
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn base_class(&self) -> &'static str {
        self.descriptor.base_class
    }

    pub fn property_name(&self) -> &'static str {
        self.descriptor.property_name
    }

    pub fn show_in_ui(&self) -> bool {
        self.descriptor.show_in_ui
    }

    pub fn is_unique_item(&self) -> bool {
        self.descriptor.is_unique_item
    }

    pub fn has_unique_item(&self) -> bool {
        self.has_unique_item
    }

    /// Offered for a new operation
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn template_name(&self) -> &'static str {
        self.descriptor.template_name()
    }

    /// Recompute uniqueness and visibility.
    ///
    /// `operations` are all operations that count against unique types.
    pub fn update<'a, I>(&mut self, survey: &Survey, operations: I)
    where
        I: IntoIterator<Item = &'a LogicOperation>,
    {
        self.has_unique_item = self.is_unique_item()
            && operations
                .into_iter()
                .any(|operation| operation.logic_type() == self.id);
        self.visible = self.show_in_ui()
            && !self.has_unique_item
            && self.descriptor.show_if.evaluate(survey);
    }

    pub fn has_item_selector(&self) -> bool {
        !self.base_class().is_empty()
            && self.show_in_ui()
            && !self.descriptor.can_create_new_element()
    }

    pub fn create_item_selector(&self) -> Option<ElementSelector> {
        self.has_item_selector().then(|| {
            ElementSelector::new(self.base_class(), self.property_name(), self.show_titles)
        })
    }

    pub fn create_new_element(&self, survey: &mut Survey) -> LogicResult<Option<ElementId>> {
        self.descriptor.create_new_element(survey)
    }

    pub fn save_element(&self, survey: &mut Survey, operation: &LogicOperation) -> LogicResult<()> {
        self.descriptor.save_element(survey, operation)
    }

    pub fn create_template_object(
        &self,
        survey: &Survey,
        element: Option<ElementId>,
    ) -> Option<TemplateObject> {
        self.descriptor.create_template_object(survey, element)
    }

    pub fn display_name(&self, strings: &dyn TextFormatter) -> String {
        strings.text(&format!("{}Name", self.name()))
    }

    pub fn description(&self, strings: &dyn TextFormatter) -> String {
        strings.text(&format!("{}Description", self.name()))
    }

    pub fn display_text(
        &self,
        survey: &Survey,
        element: Option<ElementId>,
        strings: &dyn TextFormatter,
    ) -> String {
        self.descriptor.display_text(survey, element, strings)
    }

    pub fn format_element_name(&self, name: &str) -> String {
        format_element_name(name)
    }
}
