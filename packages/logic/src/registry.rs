//! # Survey Logic Session
//!
//! Owns one survey document and presents its conditional expressions as
//! editable rules.
//!
//! ## Modes
//!
//! ```text
//!            add_new()                 edit_item(id)
//!   View ─────────────→ New     View ─────────────→ Edit
//!    ↑                   │       ↑                   │
//!    │ save_editable_item() (valid) / show_view()    │
//!    └───────────────────┴───────┴───────────────────┘
//! ```
//!
//! Leaving `New`/`Edit` always rescans the document, so the visible rule list
//! reflects exactly what the survey holds. A commit that fails validation
//! stays in the current mode and reports one message through [`SurveyLogic::error_text`].

use crate::catalog::{LogicTypeDescriptor, LOGIC_TYPES};
use crate::errors::{LogicError, LogicResult};
use crate::expression::{BalancedExpressionChecker, ExpressionValidator};
use crate::item::{rename_in_expression, ItemId, LogicItem};
use crate::localization::{Strings, TextFormatter};
use crate::logic_type::{LogicType, LogicTypeId};
use crate::operation::{LogicOperation, OperationId};
use crate::options::LogicOptions;
use crate::scan;
use std::collections::HashMap;
use std::fmt;
use survey_model::{ElementId, Survey};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicMode {
    View,
    New,
    Edit,
}

impl LogicMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicMode::View => "view",
            LogicMode::New => "new",
            LogicMode::Edit => "edit",
        }
    }
}

/// What happened to a rule at a commit point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    New,
    Modify,
    Delete,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::New => "new",
            ChangeType::Modify => "modify",
            ChangeType::Delete => "delete",
        }
    }
}

type ChangeCallback = Box<dyn FnMut(&LogicItem, ChangeType)>;

/// Logic editing session over one survey
pub struct SurveyLogic {
    survey: Survey,
    options: LogicOptions,
    catalog: &'static [LogicTypeDescriptor],
    strings: Box<dyn TextFormatter>,
    validator: Box<dyn ExpressionValidator>,
    logic_types: Vec<LogicType>,
    items: Vec<LogicItem>,
    invisible_items: Vec<LogicItem>,
    mode: LogicMode,
    editable_item: Option<LogicItem>,
    editing_expression: String,
    error_text: String,
    on_changed: Option<ChangeCallback>,
}

impl SurveyLogic {
    pub fn new(survey: Survey, options: LogicOptions) -> Self {
        Self::with_catalog(survey, options, LOGIC_TYPES)
    }

    pub fn with_catalog(
        survey: Survey,
        options: LogicOptions,
        catalog: &'static [LogicTypeDescriptor],
    ) -> Self {
        let mut logic = Self {
            survey,
            options,
            catalog,
            strings: Box::new(Strings::english()),
            validator: Box::new(BalancedExpressionChecker),
            logic_types: Vec::new(),
            items: Vec::new(),
            invisible_items: Vec::new(),
            mode: LogicMode::View,
            editable_item: None,
            editing_expression: String::new(),
            error_text: String::new(),
            on_changed: None,
        };
        logic.update(None, None);
        logic
    }

    /// Rebind to another survey and/or options and rescan from scratch
    pub fn update(&mut self, survey: Option<Survey>, options: Option<LogicOptions>) {
        if let Some(survey) = survey {
            self.survey = survey;
        }
        if let Some(options) = options {
            self.options = options;
        }

        self.logic_types = self
            .catalog
            .iter()
            .enumerate()
            .map(|(index, descriptor)| {
                LogicType::new(
                    LogicTypeId::from_index(index),
                    descriptor,
                    &self.survey,
                    &self.options,
                )
            })
            .collect();

        self.mode = LogicMode::View;
        self.update_visible_items();
        self.invisible_items = self.build_items(false);

        info!(
            logic_types = self.logic_types.len(),
            items = self.items.len(),
            invisible_items = self.invisible_items.len(),
            "Survey logic loaded"
        );
    }

    // ---- accessors ----

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    /// Direct document access. Call [`Self::update`] afterwards to rescan.
    pub fn survey_mut(&mut self) -> &mut Survey {
        &mut self.survey
    }

    pub fn into_survey(self) -> Survey {
        self.survey
    }

    pub fn options(&self) -> &LogicOptions {
        &self.options
    }

    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    pub fn strings(&self) -> &dyn TextFormatter {
        self.strings.as_ref()
    }

    pub fn set_text_formatter(&mut self, strings: impl TextFormatter + 'static) {
        self.strings = Box::new(strings);
    }

    pub fn set_expression_validator(&mut self, validator: impl ExpressionValidator + 'static) {
        self.validator = Box::new(validator);
    }

    /// Called after a rule is added, modified or deleted
    pub fn set_on_changed(&mut self, callback: impl FnMut(&LogicItem, ChangeType) + 'static) {
        self.on_changed = Some(Box::new(callback));
    }

    pub fn mode(&self) -> LogicMode {
        self.mode
    }

    pub fn items(&self) -> &[LogicItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&LogicItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// System expressions: renamed with the survey, never edited directly
    pub fn invisible_items(&self) -> &[LogicItem] {
        &self.invisible_items
    }

    pub fn logic_types(&self) -> &[LogicType] {
        &self.logic_types
    }

    pub fn logic_type(&self, id: LogicTypeId) -> Option<&LogicType> {
        self.logic_types.get(id.index())
    }

    pub fn logic_type_by_name(&self, name: &str) -> Option<&LogicType> {
        self.logic_types.iter().find(|logic_type| logic_type.name() == name)
    }

    /// Types offered for a new operation
    pub fn visible_logic_types(&self) -> impl Iterator<Item = &LogicType> + '_ {
        self.logic_types.iter().filter(|logic_type| logic_type.visible())
    }

    pub fn editable_item(&self) -> Option<&LogicItem> {
        self.editable_item.as_ref()
    }

    pub fn editing_expression(&self) -> &str {
        &self.editing_expression
    }

    pub fn set_editing_expression(&mut self, expression: impl Into<String>) {
        self.editing_expression = expression.into();
    }

    /// Message of the last failed commit, empty when there is none
    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    pub fn display_error(&self) -> bool {
        !self.error_text.is_empty()
    }

    // ---- editing ----

    /// Start authoring a new rule
    pub fn add_new(&mut self) -> LogicResult<()> {
        self.ensure_writable()?;
        self.editable_item = Some(LogicItem::new("").with_read_only(self.options.read_only));
        self.editing_expression.clear();
        self.error_text.clear();
        self.set_mode(LogicMode::New);
        Ok(())
    }

    /// Start editing a copy of an existing rule
    pub fn edit_item(&mut self, id: ItemId) -> LogicResult<()> {
        self.ensure_writable()?;
        let item = self.item(id).cloned().ok_or(LogicError::ItemNotFound(id))?;
        self.editing_expression = item.expression().to_string();
        self.editable_item = Some(item);
        self.error_text.clear();
        self.set_mode(LogicMode::Edit);
        Ok(())
    }

    /// Delete a rule, clearing the expression on every bound element
    pub fn remove_item(&mut self, id: ItemId) -> LogicResult<()> {
        self.ensure_writable()?;
        let index = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(LogicError::ItemNotFound(id))?;

        self.items[index].apply(&mut self.survey, "")?;
        let item = self.items.remove(index);

        info!(item = %item.name(), operations = item.operation_count(), "Removed logic item");
        self.notify(&item, ChangeType::Delete);

        if self.editable_item.as_ref().map(LogicItem::id) == Some(id) {
            self.set_mode(LogicMode::View);
        }
        Ok(())
    }

    /// Add an operation of `logic_type` to the editable rule.
    ///
    /// Triggers and thank-you conditions get a fresh element; other types
    /// start with an empty picker.
    pub fn add_new_operation(&mut self, logic_type: LogicTypeId) -> LogicResult<OperationId> {
        let item = self.editable_item.as_mut().ok_or(LogicError::NoEditableItem)?;
        let logic_type = self
            .logic_types
            .get(logic_type.index())
            .ok_or_else(|| LogicError::UnknownLogicType(logic_type.to_string()))?;

        let element = logic_type.create_new_element(&mut self.survey)?;
        let id = item.add_operation(logic_type, element, &self.survey);
        debug!(operation = %id, logic_type = logic_type.name(), "Added operation");

        self.update_logic_types();
        Ok(id)
    }

    pub fn add_new_operation_by_name(&mut self, name: &str) -> LogicResult<OperationId> {
        let id = self
            .logic_type_by_name(name)
            .map(LogicType::id)
            .ok_or_else(|| LogicError::UnknownLogicType(name.to_string()))?;
        self.add_new_operation(id)
    }

    pub fn remove_operation(&mut self, operation: OperationId) -> LogicResult<()> {
        let item = self.editable_item.as_mut().ok_or(LogicError::NoEditableItem)?;
        item.remove_operation(operation)
            .ok_or(LogicError::OperationNotFound(operation))?;
        debug!(operation = %operation, "Removed operation");

        self.update_logic_types();
        Ok(())
    }

    /// Bind an operation of the editable rule to an existing element
    pub fn select_operation_element(
        &mut self,
        operation: OperationId,
        element: Option<ElementId>,
    ) -> LogicResult<()> {
        let item = self.editable_item.as_mut().ok_or(LogicError::NoEditableItem)?;
        item.operation_mut(operation)
            .ok_or(LogicError::OperationNotFound(operation))?
            .select_element(&self.survey, element)
    }

    /// Operation of the editable rule, for template edits
    pub fn editable_operation_mut(
        &mut self,
        operation: OperationId,
    ) -> Option<&mut LogicOperation> {
        self.editable_item.as_mut()?.operation_mut(operation)
    }

    /// Validate the editable rule and record the message of the first problem.
    ///
    /// Invalid expression, then no operation, then an invalid operation.
    pub fn has_error(&mut self) -> bool {
        let Some(item) = &self.editable_item else {
            return false;
        };

        let message_id = if !self.validator.is_valid(&self.editing_expression) {
            Some("expressionInvalid")
        } else if item.operation_count() == 0 {
            Some("noOperationError")
        } else if item.operations().any(LogicOperation::has_error) {
            Some("operationInvalid")
        } else {
            None
        };

        self.error_text = message_id
            .map(|id| self.strings.text(id))
            .unwrap_or_default();
        message_id.is_some()
    }

    /// Commit the editable rule and return to view mode.
    ///
    /// Returns `false` and stays in the current mode when validation fails.
    pub fn save_editable_item(&mut self) -> bool {
        if self.editable_item.is_none() {
            return false;
        }
        if self.has_error() {
            warn!(error = %self.error_text, mode = self.mode.as_str(), "Rejected logic item");
            return false;
        }
        let Some(mut item) = self.editable_item.take() else {
            return false;
        };

        if let Err(err) = item.apply(&mut self.survey, &self.editing_expression) {
            warn!(error = %err, item = %item.name(), "Failed to apply logic item");
            self.error_text = err.to_string();
            self.editable_item = Some(item);
            return false;
        }

        let change = match self.items.iter().position(|existing| existing.id() == item.id()) {
            Some(index) => {
                self.items[index] = item.clone();
                ChangeType::Modify
            }
            None => {
                self.items.push(item.clone());
                ChangeType::New
            }
        };

        info!(
            item = %item.name(),
            expression = %item.expression(),
            operations = item.operation_count(),
            change = change.as_str(),
            "Saved logic item"
        );
        self.notify(&item, change);
        self.set_mode(LogicMode::View);
        true
    }

    /// Leave the editor without committing
    pub fn show_view(&mut self) {
        self.set_mode(LogicMode::View);
    }

    /// Rename a question in every rule, system expressions included
    pub fn rename_question(&mut self, old_name: &str, new_name: &str) -> LogicResult<()> {
        for item in self.items.iter_mut().chain(self.invisible_items.iter_mut()) {
            item.rename_question(&mut self.survey, old_name, new_name)?;
        }

        // Re-read operation snapshots from the renamed document. The rule
        // being edited is matched by id on commit, so visible rules wait
        // for the next return to view mode.
        self.invisible_items = self.build_items(false);
        match self.editable_item.as_mut() {
            Some(item) => {
                item.rename_in_templates(old_name, new_name);
                self.editing_expression =
                    rename_in_expression(&self.editing_expression, old_name, new_name);
            }
            None => {
                self.items = self.build_items(true);
                self.update_logic_types();
            }
        }

        info!(old_name, new_name, "Renamed question in survey logic");
        Ok(())
    }

    // ---- internals ----

    fn ensure_writable(&self) -> LogicResult<()> {
        if self.options.read_only {
            return Err(LogicError::ReadOnly);
        }
        Ok(())
    }

    fn set_mode(&mut self, mode: LogicMode) {
        let previous = self.mode;
        self.mode = mode;
        if mode == LogicMode::View {
            if previous != LogicMode::View {
                self.update_visible_items();
            }
        } else {
            self.update_logic_types();
        }
        if previous != mode {
            debug!(from = previous.as_str(), to = mode.as_str(), "Logic mode changed");
        }
    }

    fn update_visible_items(&mut self) {
        self.items = self.build_items(true);
        self.editable_item = None;
        self.error_text.clear();
        self.update_logic_types();
    }

    /// Refresh unique-type gating against every operation that would exist
    /// after the editable rule is committed.
    fn update_logic_types(&mut self) {
        let editable_id = self.editable_item.as_ref().map(LogicItem::id);
        let committed = self
            .items
            .iter()
            .filter(|item| Some(item.id()) != editable_id)
            .flat_map(LogicItem::operations);
        let operations: Vec<&LogicOperation> = committed
            .chain(self.editable_item.iter().flat_map(LogicItem::operations))
            .collect();

        for logic_type in &mut self.logic_types {
            logic_type.update(&self.survey, operations.iter().copied());
        }
    }

    /// Group every expression held by a matching element into rules
    fn build_items(&self, show_in_ui: bool) -> Vec<LogicItem> {
        let mut items: Vec<LogicItem> = Vec::new();
        let mut by_key: HashMap<String, usize> = HashMap::new();

        for element in scan::document_elements(&self.survey) {
            let kinds = self.survey.element_kinds(element);
            for logic_type in &self.logic_types {
                if logic_type.show_in_ui() != show_in_ui
                    || !logic_type.descriptor().matches(&kinds)
                {
                    continue;
                }
                let Some(expression) = self.survey.property_str(element, logic_type.property_name())
                else {
                    continue;
                };

                let key = scan::expression_key(expression);
                let index = *by_key.entry(key).or_insert_with(|| {
                    items.push(LogicItem::new(expression).with_read_only(self.options.read_only));
                    items.len() - 1
                });
                items[index].add_operation(logic_type, Some(element), &self.survey);
            }
        }

        debug!(show_in_ui, items = items.len(), "Scanned survey logic");
        items
    }

    fn notify(&mut self, item: &LogicItem, change: ChangeType) {
        if let Some(callback) = self.on_changed.as_mut() {
            callback(item, change);
        }
    }
}

impl fmt::Debug for SurveyLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurveyLogic")
            .field("mode", &self.mode)
            .field("options", &self.options)
            .field("logic_types", &format!("{} types", self.logic_types.len()))
            .field("items", &self.items.len())
            .field("invisible_items", &self.invisible_items.len())
            .field("editable_item", &self.editable_item.as_ref().map(LogicItem::name))
            .field("error_text", &self.error_text)
            .finish()
    }
}
