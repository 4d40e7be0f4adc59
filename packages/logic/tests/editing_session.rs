//! Authoring sessions driven through SurveyLogic

use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use survey_logic::{
    ChangeType, LogicError, LogicMode, LogicOptions, Strings, SurveyLogic, TemplateObject,
};
use survey_model::Survey;

const TRAVEL_SURVEY: &str = r#"{
    "pages": [
        {
            "name": "start",
            "elements": [
                { "type": "radiogroup", "name": "travels", "choices": ["yes", "no"] },
                { "type": "text", "name": "country", "title": "Which country?" }
            ]
        },
        {
            "name": "details",
            "elements": [
                { "type": "comment", "name": "story" }
            ]
        }
    ]
}"#;

fn travel_logic() -> SurveyLogic {
    SurveyLogic::new(Survey::from_json(TRAVEL_SURVEY).unwrap(), LogicOptions::default())
}

#[test]
fn test_new_trigger_is_attached_on_commit() {
    let mut logic = travel_logic();
    logic.add_new().unwrap();
    logic.set_editing_expression("{travels} = 'no'");

    let operation = logic.add_new_operation_by_name("trigger_skip").unwrap();
    assert!(logic.survey().triggers().is_empty());
    assert!(!logic.save_editable_item());
    assert_eq!(logic.error_text(), "Please, fix problems in your operation(s).");

    if let Some(TemplateObject::Trigger(template)) = logic
        .editable_operation_mut(operation)
        .and_then(|op| op.template_object_mut())
    {
        assert!(template.set_field("gotoName", "story"));
    }
    assert!(logic.save_editable_item());

    let json = logic.survey().to_value();
    assert_eq!(
        json["triggers"],
        json!([{ "type": "skip", "expression": "{travels} = 'no'", "gotoName": "story" }])
    );
    assert_eq!(logic.items().len(), 1);
    assert_eq!(
        logic.items()[0].operations().next().unwrap().text(logic.survey(), logic.strings()),
        "Survey skip to the question {story}"
    );
}

#[test]
fn test_thank_you_page_on_condition() {
    let mut logic = travel_logic();
    logic.add_new().unwrap();
    logic.set_editing_expression("{travels} = 'yes'");

    let operation = logic.add_new_operation_by_name("completedHtmlOnCondition").unwrap();
    if let Some(TemplateObject::Html(template)) = logic
        .editable_operation_mut(operation)
        .and_then(|op| op.template_object_mut())
    {
        template.set_html("<h3>Safe travels!</h3>");
    }
    assert!(logic.save_editable_item());

    let json = logic.survey().to_value();
    assert_eq!(
        json["completedHtmlOnCondition"],
        json!([{ "expression": "{travels} = 'yes'", "html": "<h3>Safe travels!</h3>" }])
    );

    logic.add_new().unwrap();
    assert!(!logic.logic_type_by_name("completedHtmlOnCondition").unwrap().visible());
}

#[test]
fn test_unique_type_hides_while_editing() {
    let mut logic = travel_logic();
    logic.add_new().unwrap();
    assert!(logic.logic_type_by_name("trigger_complete").unwrap().visible());

    let operation = logic.add_new_operation_by_name("trigger_complete").unwrap();
    assert!(!logic.logic_type_by_name("trigger_complete").unwrap().visible());

    logic.remove_operation(operation).unwrap();
    assert!(logic.logic_type_by_name("trigger_complete").unwrap().visible());
}

#[test]
fn test_discard_keeps_survey_untouched() {
    let mut logic = travel_logic();
    let before = logic.survey().to_value();

    logic.add_new().unwrap();
    logic.set_editing_expression("{travels} = 'yes'");
    let operation = logic.add_new_operation_by_name("question_visibility").unwrap();
    let country = logic.survey().find_question("country");
    logic.select_operation_element(operation, country).unwrap();
    logic.show_view();

    assert_eq!(logic.mode(), LogicMode::View);
    assert!(logic.items().is_empty());
    assert_eq!(logic.survey().to_value(), before);
}

#[test]
fn test_edit_remove_operation_and_notify() {
    let mut survey = Survey::from_json(TRAVEL_SURVEY).unwrap();
    let country = survey.find_question("country").unwrap();
    let story = survey.find_question("story").unwrap();
    survey.set_property(country, "visibleIf", "{travels} = 'yes'").unwrap();
    survey.set_property(story, "visibleIf", "{travels} = 'yes'").unwrap();

    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let mut logic = SurveyLogic::new(survey, LogicOptions::default());
    logic.set_on_changed(move |_, change| sink.borrow_mut().push(change));

    let id = logic.items()[0].id();
    logic.edit_item(id).unwrap();
    assert_eq!(logic.mode(), LogicMode::Edit);

    let first = logic.editable_item().unwrap().operations().next().unwrap().id();
    logic.remove_operation(first).unwrap();
    assert!(logic.save_editable_item());

    assert!(!logic.survey().has_value(country, "visibleIf"));
    assert_eq!(logic.survey().property_str(story, "visibleIf"), Some("{travels} = 'yes'"));

    let id = logic.items()[0].id();
    logic.remove_item(id).unwrap();
    assert!(!logic.survey().has_value(story, "visibleIf"));

    assert_eq!(*changes.borrow(), vec![ChangeType::Modify, ChangeType::Delete]);
}

#[test]
fn test_selector_choices_respect_bound_elements_and_titles() {
    let mut survey = Survey::from_json(TRAVEL_SURVEY).unwrap();
    let story = survey.find_question("story").unwrap();
    survey.set_property(story, "visibleIf", "{travels} = 'yes'").unwrap();

    let options = LogicOptions {
        show_titles_in_expressions: true,
        ..LogicOptions::default()
    };
    let mut logic = SurveyLogic::new(survey, options);
    logic.add_new().unwrap();
    let operation = logic.add_new_operation_by_name("question_visibility").unwrap();

    let selector = logic
        .editable_item()
        .unwrap()
        .operation(operation)
        .unwrap()
        .item_selector()
        .unwrap();
    let texts: Vec<_> = selector
        .choices(logic.survey())
        .into_iter()
        .map(|choice| choice.text)
        .collect();
    assert_eq!(texts, vec!["travels", "Which country?"]);
}

#[test]
fn test_page_visibility_offered_for_multi_page_surveys() {
    let mut logic = travel_logic();
    logic.add_new().unwrap();
    assert!(logic.logic_type_by_name("page_visibility").unwrap().visible());
    assert!(!logic.logic_type_by_name("panel_visibility").unwrap().visible());
    assert!(!logic.logic_type_by_name("calculatedValue").unwrap().visible());
}

#[test]
fn test_update_rebinds_survey() {
    let mut logic = travel_logic();
    assert!(logic.items().is_empty());

    let mut survey = Survey::from_json(TRAVEL_SURVEY).unwrap();
    let story = survey.find_question("story").unwrap();
    survey.set_property(story, "enableIf", "{travels} = 'yes'").unwrap();

    logic.add_new().unwrap();
    logic.update(Some(survey), None);
    assert_eq!(logic.mode(), LogicMode::View);
    assert!(logic.editable_item().is_none());
    assert_eq!(logic.items().len(), 1);
}

#[test]
fn test_localized_texts() {
    let mut strings = Strings::english();
    strings.set("noOperationError", "Add an action first");

    let mut logic = travel_logic();
    logic.set_text_formatter(strings);
    logic.add_new().unwrap();
    logic.set_editing_expression("{travels} = 'yes'");

    assert!(!logic.save_editable_item());
    assert_eq!(logic.error_text(), "Add an action first");
}

const RUN_EXPRESSION_SURVEY: &str = r#"{
    "pages": [
        {
            "name": "page1",
            "elements": [
                { "type": "text", "name": "q1" },
                { "type": "text", "name": "q2" }
            ]
        }
    ],
    "triggers": [
        {
            "type": "runexpression",
            "expression": "{q1} = 2",
            "runExpression": "{q1} + 1",
            "setToName": "q2"
        }
    ]
}"#;

fn run_expression_logic() -> SurveyLogic {
    let survey = Survey::from_json(RUN_EXPRESSION_SURVEY).unwrap();
    SurveyLogic::new(survey, LogicOptions::default())
}

#[test]
fn test_rename_survives_removing_the_trigger_rule() {
    let mut logic = run_expression_logic();
    let trigger = logic.survey().triggers()[0];

    logic.rename_question("q1", "age").unwrap();
    assert_eq!(logic.survey().property_str(trigger, "runExpression"), Some("{age} + 1"));

    let id = logic.items()[0].id();
    logic.remove_item(id).unwrap();
    assert_eq!(logic.survey().property_str(trigger, "runExpression"), Some("{age} + 1"));
    assert!(!logic.survey().has_value(trigger, "expression"));
}

#[test]
fn test_rename_survives_editing_the_trigger_rule() {
    let mut logic = run_expression_logic();
    let trigger = logic.survey().triggers()[0];

    logic.rename_question("q1", "age").unwrap();
    let id = logic.items()[0].id();
    assert_eq!(logic.items()[0].expression(), "{age} = 2");

    logic.edit_item(id).unwrap();
    assert!(logic.save_editable_item());
    assert_eq!(logic.survey().property_str(trigger, "runExpression"), Some("{age} + 1"));
    assert_eq!(logic.survey().property_str(trigger, "expression"), Some("{age} = 2"));
    assert_eq!(logic.survey().property_str(trigger, "setToName"), Some("q2"));
}

#[test]
fn test_rename_while_editing_the_trigger_rule() {
    let mut logic = run_expression_logic();
    let trigger = logic.survey().triggers()[0];

    let id = logic.items()[0].id();
    logic.edit_item(id).unwrap();
    logic.rename_question("q1", "age").unwrap();
    assert_eq!(logic.editing_expression(), "{age} = 2");

    assert!(logic.save_editable_item());
    assert_eq!(logic.items().len(), 1);
    assert_eq!(logic.survey().property_str(trigger, "runExpression"), Some("{age} + 1"));
    assert_eq!(logic.survey().property_str(trigger, "expression"), Some("{age} = 2"));
}

#[test]
fn test_new_rule_cannot_take_over_a_bound_question() {
    let mut survey = Survey::from_json(TRAVEL_SURVEY).unwrap();
    let story = survey.find_question("story").unwrap();
    survey.set_property(story, "visibleIf", "{travels} = 'yes'").unwrap();
    let mut logic = SurveyLogic::new(survey, LogicOptions::default());

    logic.add_new().unwrap();
    logic.set_editing_expression("{travels} = 'no'");
    let operation = logic.add_new_operation_by_name("question_visibility").unwrap();
    let err = logic.select_operation_element(operation, Some(story)).unwrap_err();
    assert!(matches!(err, LogicError::ElementAlreadyBound { element, .. } if element == story));

    assert!(!logic.save_editable_item());
    logic.show_view();
    assert_eq!(logic.items().len(), 1);
    assert_eq!(logic.survey().property_str(story, "visibleIf"), Some("{travels} = 'yes'"));
}

#[test]
fn test_localized_thank_you_page_can_be_edited() {
    let survey = Survey::from_json(
        r#"{
            "pages": [{ "name": "page1", "elements": [{ "type": "text", "name": "q1" }] }],
            "completedHtmlOnCondition": [
                { "expression": "{q1} = 1", "html": { "default": "Bye", "de": "Tschuss" } }
            ]
        }"#,
    )
    .unwrap();
    let mut logic = SurveyLogic::new(survey, LogicOptions::default());

    let id = logic.items()[0].id();
    logic.edit_item(id).unwrap();
    logic.set_editing_expression("{q1} = 2");
    assert!(logic.save_editable_item(), "{}", logic.error_text());

    let json = logic.survey().to_value();
    assert_eq!(
        json["completedHtmlOnCondition"],
        json!([{ "expression": "{q1} = 2", "html": { "default": "Bye", "de": "Tschuss" } }])
    );
}

#[test]
fn test_removing_the_rule_being_edited_ends_the_edit() {
    let mut survey = Survey::from_json(TRAVEL_SURVEY).unwrap();
    let story = survey.find_question("story").unwrap();
    survey.set_property(story, "visibleIf", "{travels} = 'yes'").unwrap();
    let mut logic = SurveyLogic::new(survey, LogicOptions::default());

    let id = logic.items()[0].id();
    logic.edit_item(id).unwrap();
    logic.remove_item(id).unwrap();

    assert_eq!(logic.mode(), LogicMode::View);
    assert!(logic.editable_item().is_none());
    assert!(!logic.save_editable_item());
    assert!(logic.items().is_empty());
    assert!(!logic.survey().has_value(story, "visibleIf"));
}
