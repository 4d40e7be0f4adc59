//! Element picker for operations that bind to an existing element.

use crate::scan;
use serde::Serialize;
use survey_model::{ElementId, Survey};

/// One pickable element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorChoice {
    pub element: ElementId,
    pub text: String,
}

/// Selects an element of `base_class`, skipping elements that already hold
/// an expression in `disabled_property_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSelector {
    base_class: &'static str,
    disabled_property_name: &'static str,
    show_titles: bool,
    element: Option<ElementId>,
}

impl ElementSelector {
    pub fn new(
        base_class: &'static str,
        disabled_property_name: &'static str,
        show_titles: bool,
    ) -> Self {
        Self {
            base_class,
            disabled_property_name,
            show_titles,
            element: None,
        }
    }

    pub fn base_class(&self) -> &'static str {
        self.base_class
    }

    pub fn disabled_property_name(&self) -> &'static str {
        self.disabled_property_name
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    pub(crate) fn set_element(&mut self, element: Option<ElementId>) {
        self.element = element;
    }

    /// Candidates in document order. The current selection is always kept.
    pub fn choices(&self, survey: &Survey) -> Vec<SelectorChoice> {
        scan::document_elements(survey)
            .into_iter()
            .filter(|&id| survey.is_kind(id, self.base_class))
            .filter(|&id| {
                Some(id) == self.element || !survey.has_value(id, self.disabled_property_name)
            })
            .filter_map(|id| {
                let element = survey.element(id)?;
                let name = element.name()?;
                let text = if self.show_titles {
                    element.property_str("title").unwrap_or(name)
                } else {
                    name
                };
                Some(SelectorChoice {
                    element: id,
                    text: text.to_string(),
                })
            })
            .collect()
    }

    pub fn has_error(&self) -> bool {
        self.element.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choices_skip_bound_elements() {
        let mut survey = Survey::new();
        let page = survey.add_page("page1");
        let q1 = survey.add_question(page, "text", "q1").unwrap();
        let q2 = survey.add_question(page, "text", "q2").unwrap();
        survey.set_property(q2, "visibleIf", "{q1} = 1").unwrap();

        let mut selector = ElementSelector::new("question", "visibleIf", false);
        let ids: Vec<_> = selector.choices(&survey).iter().map(|c| c.element).collect();
        assert_eq!(ids, vec![q1]);

        selector.set_element(Some(q2));
        let ids: Vec<_> = selector.choices(&survey).iter().map(|c| c.element).collect();
        assert_eq!(ids, vec![q1, q2]);
    }

    #[test]
    fn test_titles_replace_names() {
        let mut survey = Survey::new();
        let page = survey.add_page("page1");
        let q1 = survey.add_question(page, "text", "q1").unwrap();
        survey.set_property(q1, "title", "Your age").unwrap();
        survey.add_question(page, "text", "q2").unwrap();

        let selector = ElementSelector::new("question", "enableIf", true);
        let texts: Vec<_> = selector.choices(&survey).into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["Your age", "q2"]);
    }

    #[test]
    fn test_empty_selection_is_an_error() {
        let mut survey = Survey::new();
        let page = survey.add_page("page1");

        let mut selector = ElementSelector::new("page", "visibleIf", false);
        assert!(selector.has_error());
        selector.set_element(Some(page));
        assert!(!selector.has_error());
    }
}
