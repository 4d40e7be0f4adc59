//! Document-order walk over every element that can carry an expression.

use survey_model::{ElementId, Survey};

const COLUMN_CLASS: &str = "matrixdropdowncolumn";
const ITEM_VALUES: &str = "itemvalue[]";

/// Pages, questions, panels, triggers, thank-you conditions, calculated
/// values, dropdown matrix columns, validators and choices, in that order.
pub fn document_elements(survey: &Survey) -> Vec<ElementId> {
    let questions = survey.all_questions();

    let mut elements = Vec::new();
    elements.extend_from_slice(survey.pages());
    elements.extend_from_slice(&questions);
    elements.extend(survey.all_panels());
    elements.extend_from_slice(survey.triggers());
    elements.extend_from_slice(survey.completed_html_on_condition());
    elements.extend_from_slice(survey.calculated_values());

    for &question in &questions {
        let is_column_matrix = survey
            .property_decl(question, "columns")
            .is_some_and(|decl| decl.class_name.as_deref() == Some(COLUMN_CLASS));
        if is_column_matrix {
            elements.extend_from_slice(survey.collection(question, "columns"));
        }
    }
    for &question in &questions {
        elements.extend_from_slice(survey.collection(question, "validators"));
    }
    for &question in &questions {
        let has_choices = survey
            .property_decl(question, "choices")
            .is_some_and(|decl| decl.type_name == ITEM_VALUES);
        if has_choices {
            elements.extend_from_slice(survey.collection(question, "choices"));
        }
    }

    elements
}

/// Grouping key: whitespace removed, lowercased
pub fn expression_key(expression: &str) -> String {
    expression
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
