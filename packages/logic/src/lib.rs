//! # Survey Logic
//!
//! Editor core that presents a survey's conditional expressions as rules.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ catalog: which element kind + property      │
//! │ pairs hold expressions, and their policy    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ scan: walk the survey, group equal          │
//! │ expressions into LogicItems                 │
//! │  - one LogicOperation per bound element     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ SurveyLogic: view / new / edit session      │
//! │  - validate, commit, delete, rename         │
//! │  - writes expressions back into the survey  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use survey_logic::{LogicOptions, SurveyLogic};
//! use survey_model::Survey;
//!
//! let survey = Survey::from_json(&source)?;
//! let mut logic = SurveyLogic::new(survey, LogicOptions::default());
//!
//! logic.add_new()?;
//! logic.set_editing_expression("{age} >= 18");
//! let op = logic.add_new_operation_by_name("question_visibility")?;
//! logic.select_operation_element(op, logic.survey().find_question("license"))?;
//! assert!(logic.save_editable_item());
//!
//! logic.rename_question("age", "years")?;
//! ```

pub mod catalog;
mod errors;
mod expression;
mod item;
mod localization;
mod logic_type;
mod operation;
mod options;
mod registry;
pub mod scan;
mod selector;
mod template;

pub use catalog::{format_element_name, DisplayText, LogicTypeDescriptor, ShowIf, LOGIC_TYPES};
pub use errors::{LogicError, LogicResult};
pub use expression::{BalancedExpressionChecker, ExpressionValidator};
pub use item::{rename_in_expression, ItemId, LogicItem, TITLE_LENGTH};
pub use localization::{format_text, Strings, TextFormatter};
pub use logic_type::{LogicType, LogicTypeId};
pub use operation::{LogicOperation, OperationId};
pub use options::LogicOptions;
pub use registry::{ChangeType, LogicMode, SurveyLogic};
pub use selector::{ElementSelector, SelectorChoice};
pub use template::{HtmlTemplate, TemplateObject, TriggerTemplate};
