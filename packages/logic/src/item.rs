//! # Logic Items
//!
//! A logic item is one rule: an expression plus the operations it drives.
//! Every operation writes the same expression into its own element, so the
//! item is the unit the author adds, edits and deletes.

use crate::errors::LogicResult;
use crate::localization::TextFormatter;
use crate::logic_type::{LogicType, LogicTypeId};
use crate::operation::{LogicOperation, OperationId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use survey_model::{ElementId, Survey};
use tracing::debug;

/// Characters of the expression shown before the title is cut
pub const TITLE_LENGTH: usize = 50;

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId(u64);

impl ItemId {
    fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "logicItem{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicItem {
    id: ItemId,
    expression: String,
    operations: BTreeMap<OperationId, LogicOperation>,
    removed_operations: Vec<LogicOperation>,
    read_only: bool,
}

impl LogicItem {
    pub fn new(expression: &str) -> Self {
        Self {
            id: ItemId::next(),
            expression: expression.to_string(),
            operations: BTreeMap::new(),
            removed_operations: Vec::new(),
            read_only: false,
        }
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Unique name, `logicItem{N}`
    pub fn name(&self) -> String {
        self.id.to_string()
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The expression, cut to [`TITLE_LENGTH`] characters plus `...`
    pub fn title(&self) -> String {
        if self.expression.chars().count() <= TITLE_LENGTH {
            return self.expression.clone();
        }
        let head: String = self.expression.chars().take(TITLE_LENGTH).collect();
        format!("{head}...")
    }

    pub fn expression_text(&self, strings: &dyn TextFormatter) -> String {
        strings.format(&strings.text("itemExpressionText"), &[&self.expression])
    }

    /// Operations in creation order
    pub fn operations(&self) -> impl Iterator<Item = &LogicOperation> + '_ {
        self.operations.values()
    }

    pub fn operation(&self, id: OperationId) -> Option<&LogicOperation> {
        self.operations.get(&id)
    }

    pub fn operation_mut(&mut self, id: OperationId) -> Option<&mut LogicOperation> {
        self.operations.get_mut(&id)
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    pub fn removed_operations(&self) -> &[LogicOperation] {
        &self.removed_operations
    }

    pub fn uses_logic_type(&self, logic_type: LogicTypeId) -> bool {
        self.operations().any(|operation| operation.logic_type() == logic_type)
    }

    pub fn add_operation(
        &mut self,
        logic_type: &LogicType,
        element: Option<ElementId>,
        survey: &Survey,
    ) -> OperationId {
        let operation = LogicOperation::new(logic_type, element, survey);
        let id = operation.id();
        self.operations.insert(id, operation);
        id
    }

    /// Detach an operation. Its property is cleared on the next [`Self::apply`].
    pub fn remove_operation(&mut self, id: OperationId) -> Option<LogicTypeId> {
        let operation = self.operations.remove(&id)?;
        let logic_type = operation.logic_type();
        self.removed_operations.push(operation);
        Some(logic_type)
    }

    /// Commit the rule: clear removed and duplicate operations, then write
    /// `expression` into every remaining one.
    pub fn apply(&mut self, survey: &mut Survey, expression: &str) -> LogicResult<()> {
        self.remove_same_operations();
        for operation in std::mem::take(&mut self.removed_operations) {
            operation.apply(survey, "", false)?;
        }
        self.apply_expression(survey, expression, false)
    }

    /// Replace `{old_name}` in the expression and in the operations'
    /// question-name properties.
    pub fn rename_question(
        &mut self,
        survey: &mut Survey,
        old_name: &str,
        new_name: &str,
    ) -> LogicResult<()> {
        if old_name.is_empty() || new_name.is_empty() {
            return Ok(());
        }

        let renamed = rename_in_expression(&self.expression, old_name, new_name);
        if renamed != self.expression {
            debug!(item = %self.id, expression = %renamed, "Renamed question in expression");
            self.apply_expression(survey, &renamed, true)?;
        }
        for operation in self.operations.values_mut() {
            operation.rename_question(survey, old_name, new_name)?;
        }
        Ok(())
    }

    /// Rename inside the uncommitted state only: trigger templates of the
    /// operations. The document is left to the committed rules.
    pub(crate) fn rename_in_templates(&mut self, old_name: &str, new_name: &str) {
        for operation in self.operations.values_mut() {
            if let Some(template) = operation.template_object_mut() {
                template.rename_question(old_name, new_name);
            }
        }
    }

    fn apply_expression(
        &mut self,
        survey: &mut Survey,
        expression: &str,
        is_renaming: bool,
    ) -> LogicResult<()> {
        self.expression = expression.to_string();
        for operation in self.operations.values() {
            operation.apply(survey, expression, is_renaming)?;
        }
        Ok(())
    }

    /// Later operations equal to an earlier one move to the removed list
    fn remove_same_operations(&mut self) {
        let ids: Vec<OperationId> = self.operations.keys().copied().collect();
        for (position, id) in ids.iter().enumerate() {
            let Some(operation) = self.operations.get(id) else {
                continue;
            };
            let duplicate = ids[..position]
                .iter()
                .filter_map(|earlier| self.operations.get(earlier))
                .any(|earlier| earlier.equals(operation));
            if duplicate {
                if let Some(operation) = self.operations.remove(id) {
                    self.removed_operations.push(operation);
                }
            }
        }
    }
}

/// Case-insensitive replacement of every `{old}` marker with `{new}`.
///
/// The closing brace bounds each match, so `{q1}` never hits `{q12}`.
pub fn rename_in_expression(expression: &str, old_name: &str, new_name: &str) -> String {
    let marker: Vec<char> = format!("{{{old_name}}}").to_lowercase().chars().collect();
    let replacement = format!("{{{new_name}}}");
    let chars: Vec<char> = expression.chars().collect();

    let mut result = String::with_capacity(expression.len());
    let mut pos = 0;
    while pos < chars.len() {
        let matched = pos + marker.len() <= chars.len()
            && chars[pos..pos + marker.len()]
                .iter()
                .zip(&marker)
                .all(|(c, m)| c.to_lowercase().eq(m.to_lowercase()));
        if matched {
            result.push_str(&replacement);
            pos += marker.len();
        } else {
            result.push(chars[pos]);
            pos += 1;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LOGIC_TYPES;
    use crate::options::LogicOptions;

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
    fn test_rename_in_expression() {
        assert_eq!(
            rename_in_expression("{q1} > 5 and {Q1} < 10", "q1", "q2"),
            "{q2} > 5 and {q2} < 10"
        );
        assert_eq!(rename_in_expression("{q12} = {q1}", "q1", "age"), "{q12} = {age}");
        assert_eq!(rename_in_expression("{größe} = 1", "GRÖSSE", "x"), "{größe} = 1");
        assert_eq!(rename_in_expression("{Größe} = 1", "größe", "height"), "{height} = 1");
    }

    #[test]
    fn test_title_is_truncated() {
        let item = LogicItem::new(&"x".repeat(60));
        assert_eq!(item.title(), format!("{}...", "x".repeat(50)));

        let item = LogicItem::new("{q1} = 1");
        assert_eq!(item.title(), "{q1} = 1");
    }

    #[test]
    fn test_names_are_unique() {
        let a = LogicItem::new("");
        let b = LogicItem::new("");
        assert_ne!(a.name(), b.name());
        assert!(a.name().starts_with("logicItem"));
    }

    #[test]
    fn test_apply_clears_removed_and_duplicate_operations() {
        let mut survey = Survey::new();
        let page = survey.add_page("page1");
        let q1 = survey.add_question(page, "text", "q1").unwrap();
        let q2 = survey.add_question(page, "text", "q2").unwrap();
        let visibility = logic_type("question_visibility", &survey);

        let mut item = LogicItem::new("");
        let first = item.add_operation(&visibility, Some(q1), &survey);
        item.add_operation(&visibility, Some(q1), &survey);
        let removed = item.add_operation(&visibility, Some(q2), &survey);
        assert_eq!(item.operation_count(), 3);
        item.apply(&mut survey, "{q3} = 1").unwrap();
        assert_eq!(item.operation_count(), 2);

        assert_eq!(item.remove_operation(removed), Some(visibility.id()));
        item.apply(&mut survey, "{q3} = 2").unwrap();

        let ids: Vec<_> = item.operations().map(LogicOperation::id).collect();
        assert_eq!(ids, vec![first]);
        assert!(item.removed_operations().is_empty());
        assert_eq!(survey.property_str(q1, "visibleIf"), Some("{q3} = 2"));
        assert_eq!(survey.property_str(q2, "visibleIf"), None);
    }

    #[test]
    fn test_rename_without_change_keeps_expression() {
        let mut survey = Survey::new();
        let mut item = LogicItem::new("{q2} = 1");
        item.rename_question(&mut survey, "q1", "age").unwrap();
        assert_eq!(item.expression(), "{q2} = 1");
    }
}
