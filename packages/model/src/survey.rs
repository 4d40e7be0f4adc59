//! # Survey Document
//!
//! Arena-backed survey tree.
//!
//! The survey owns every element. Pages list their questions and panels in an
//! `elements` collection, panels nest the same way, and document-level lists
//! hold triggers, "thank you page" conditions and calculated values.
//! Elements are referenced everywhere else by [`ElementId`].

use crate::class_registry::ClassRegistry;
use crate::element::{Element, ElementId};
use crate::error::{ModelError, ModelResult};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Collection holding the questions and panels of a page or panel
pub const ELEMENTS: &str = "elements";

/// Editable survey document
#[derive(Debug, Clone)]
pub struct Survey {
    pub(crate) classes: Arc<ClassRegistry>,
    pub(crate) elements: Vec<Element>,
    /// Survey-level settings (title, locale, ...)
    pub(crate) properties: Map<String, Value>,
    pub(crate) pages: Vec<ElementId>,
    pub(crate) triggers: Vec<ElementId>,
    pub(crate) completed_html_on_condition: Vec<ElementId>,
    pub(crate) calculated_values: Vec<ElementId>,
}

impl Survey {
    /// Empty survey using the default class registry
    pub fn new() -> Self {
        Self::with_classes(Arc::new(ClassRegistry::default()))
    }

    pub fn with_classes(classes: Arc<ClassRegistry>) -> Self {
        Self {
            classes,
            elements: Vec::new(),
            properties: Map::new(),
            pages: Vec::new(),
            triggers: Vec::new(),
            completed_html_on_condition: Vec::new(),
            calculated_values: Vec::new(),
        }
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    // ---- element access ----

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.index())
    }

    fn element_or_err(&mut self, id: ElementId) -> ModelResult<&mut Element> {
        self.elements
            .get_mut(id.index())
            .ok_or(ModelError::ElementNotFound(id))
    }

    pub fn kind_of(&self, id: ElementId) -> Option<&str> {
        self.element(id).map(Element::kind)
    }

    /// Kind of the element followed by all of its ancestor kinds
    pub fn element_kinds(&self, id: ElementId) -> Vec<&str> {
        match self.element(id) {
            Some(element) => self.classes.ancestors(element.kind()),
            None => Vec::new(),
        }
    }

    /// Whether the element's kind is `base` or inherits from it
    pub fn is_kind(&self, id: ElementId, base: &str) -> bool {
        self.element_kinds(id).contains(&base)
    }

    pub fn property_str(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id)?.property_str(name)
    }

    pub fn property_text(&self, id: ElementId, name: &str) -> Option<String> {
        self.element(id)?.property_text(name)
    }

    pub fn has_value(&self, id: ElementId, name: &str) -> bool {
        self.element(id).is_some_and(|element| element.has_value(name))
    }

    /// Child ids of a named collection on an element
    pub fn collection(&self, id: ElementId, name: &str) -> &[ElementId] {
        self.element(id)
            .map(|element| element.collection(name))
            .unwrap_or(&[])
    }

    /// Declared schema of a property on the element's kind
    pub fn property_decl(&self, id: ElementId, name: &str) -> Option<&crate::PropertyDecl> {
        self.classes.find_property(self.kind_of(id)?, name)
    }

    // ---- document collections ----

    pub fn pages(&self) -> &[ElementId] {
        &self.pages
    }

    /// Every question in document order, descending into panels
    pub fn all_questions(&self) -> Vec<ElementId> {
        let mut questions = Vec::new();
        for &page in &self.pages {
            self.collect_questions(page, &mut questions);
        }
        questions
    }

    /// Every panel in document order, nested panels after their parent
    pub fn all_panels(&self) -> Vec<ElementId> {
        let mut panels = Vec::new();
        for &page in &self.pages {
            self.collect_panels(page, &mut panels);
        }
        panels
    }

    pub fn triggers(&self) -> &[ElementId] {
        &self.triggers
    }

    pub fn completed_html_on_condition(&self) -> &[ElementId] {
        &self.completed_html_on_condition
    }

    pub fn calculated_values(&self) -> &[ElementId] {
        &self.calculated_values
    }

    /// Find a question by name, ignoring case
    pub fn find_question(&self, name: &str) -> Option<ElementId> {
        let name = name.to_lowercase();
        self.all_questions().into_iter().find(|&id| {
            self.element(id)
                .and_then(Element::name)
                .is_some_and(|n| n.to_lowercase() == name)
        })
    }

    fn is_container(&self, id: ElementId) -> bool {
        self.is_kind(id, "panelbase")
    }

    fn collect_questions(&self, container: ElementId, out: &mut Vec<ElementId>) {
        for &child in self.collection(container, ELEMENTS) {
            if self.is_container(child) {
                self.collect_questions(child, out);
            } else {
                out.push(child);
            }
        }
    }

    fn collect_panels(&self, container: ElementId, out: &mut Vec<ElementId>) {
        for &child in self.collection(container, ELEMENTS) {
            if self.is_container(child) {
                out.push(child);
                self.collect_panels(child, out);
            }
        }
    }

    // ---- mutations ----

    /// Write a string property. An empty string clears it.
    pub fn set_property(&mut self, id: ElementId, name: &str, value: &str) -> ModelResult<()> {
        self.element_or_err(id)?.set_property(name, value);
        Ok(())
    }

    /// Write a raw property value. Empty values clear it.
    pub fn set_value(&mut self, id: ElementId, name: &str, value: Value) -> ModelResult<()> {
        self.element_or_err(id)?.set_value(name, value);
        Ok(())
    }

    pub fn set_survey_property(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }

    /// Place an element into the arena without attaching it anywhere
    pub fn insert_element(&mut self, element: Element) -> ElementId {
        let id = ElementId::from_index(self.elements.len());
        self.elements.push(element);
        id
    }

    /// Construct a blank element of a registered kind, owned by this survey
    /// but not yet attached to any collection
    pub fn create_element(&mut self, kind: &str) -> ModelResult<ElementId> {
        let element = self
            .classes
            .create(kind)
            .ok_or_else(|| ModelError::UnknownClass(kind.to_string()))?;
        Ok(self.insert_element(element))
    }

    pub fn add_page(&mut self, name: &str) -> ElementId {
        let mut page = Element::new("page");
        page.set_property("name", name);
        page.ensure_collection(ELEMENTS);
        let id = self.insert_element(page);
        self.pages.push(id);
        id
    }

    /// Create a named question of `kind` inside a page or panel
    pub fn add_question(
        &mut self,
        container: ElementId,
        kind: &str,
        name: &str,
    ) -> ModelResult<ElementId> {
        self.add_named(container, kind, name)
    }

    /// Create a named panel inside a page or panel
    pub fn add_panel(&mut self, container: ElementId, name: &str) -> ModelResult<ElementId> {
        let id = self.add_named(container, "panel", name)?;
        self.element_or_err(id)?.ensure_collection(ELEMENTS);
        Ok(id)
    }

    fn add_named(
        &mut self,
        container: ElementId,
        kind: &str,
        name: &str,
    ) -> ModelResult<ElementId> {
        self.element_or_err(container)?;
        let id = self.create_element(kind)?;
        self.set_property(id, "name", name)?;
        self.add_child(container, ELEMENTS, id)?;
        Ok(id)
    }

    /// Append an existing element to a named collection of `parent`
    pub fn add_child(
        &mut self,
        parent: ElementId,
        collection: &str,
        child: ElementId,
    ) -> ModelResult<()> {
        self.element_or_err(child)?;
        self.element_or_err(parent)?.push_child(collection, child);
        Ok(())
    }

    /// Create an element of `kind` and append it to a named collection of `parent`
    pub fn create_child(
        &mut self,
        parent: ElementId,
        collection: &str,
        kind: &str,
    ) -> ModelResult<ElementId> {
        self.element_or_err(parent)?;
        let child = self.create_element(kind)?;
        self.add_child(parent, collection, child)?;
        Ok(child)
    }

    pub fn push_trigger(&mut self, id: ElementId) -> ModelResult<()> {
        self.element_or_err(id)?;
        self.triggers.push(id);
        Ok(())
    }

    pub fn push_completed_html(&mut self, id: ElementId) -> ModelResult<()> {
        self.element_or_err(id)?;
        self.completed_html_on_condition.push(id);
        Ok(())
    }

    pub fn push_calculated_value(&mut self, id: ElementId) -> ModelResult<()> {
        self.element_or_err(id)?;
        self.calculated_values.push(id);
        Ok(())
    }
}

impl Default for Survey {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Survey, Vec<ElementId>) {
        let mut survey = Survey::new();
        let page1 = survey.add_page("page1");
        let q1 = survey.add_question(page1, "text", "q1").unwrap();
        let panel = survey.add_panel(page1, "panel1").unwrap();
        let q2 = survey.add_question(panel, "checkbox", "q2").unwrap();
        let inner = survey.add_panel(panel, "panel2").unwrap();
        let q3 = survey.add_question(inner, "text", "q3").unwrap();
        let page2 = survey.add_page("page2");
        let q4 = survey.add_question(page2, "dropdown", "q4").unwrap();
        (survey, vec![q1, panel, q2, inner, q3, q4])
    }

    #[test]
    fn test_all_questions_in_document_order() {
        let (survey, ids) = sample();
        assert_eq!(survey.all_questions(), vec![ids[0], ids[2], ids[4], ids[5]]);
    }

    #[test]
    fn test_all_panels_nested_after_parent() {
        let (survey, ids) = sample();
        assert_eq!(survey.all_panels(), vec![ids[1], ids[3]]);
    }

    #[test]
    fn test_is_kind_uses_hierarchy() {
        let (survey, ids) = sample();
        assert!(survey.is_kind(ids[2], "selectbase"));
        assert!(survey.is_kind(ids[2], "question"));
        assert!(!survey.is_kind(ids[0], "selectbase"));
    }

    #[test]
    fn test_find_question_ignores_case() {
        let (survey, ids) = sample();
        assert_eq!(survey.find_question("Q3"), Some(ids[4]));
        assert_eq!(survey.find_question("missing"), None);
    }

    #[test]
    fn test_create_element_rejects_unknown_kind() {
        let mut survey = Survey::new();
        let err = survey.create_element("teleporttrigger").unwrap_err();
        assert!(matches!(err, ModelError::UnknownClass(kind) if kind == "teleporttrigger"));
    }

    #[test]
    fn test_created_element_is_detached() {
        let mut survey = Survey::new();
        let trigger = survey.create_element("completetrigger").unwrap();
        assert!(survey.triggers().is_empty());

        survey.push_trigger(trigger).unwrap();
        assert_eq!(survey.triggers(), &[trigger]);
    }
}
