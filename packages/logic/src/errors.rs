//! Error types for the logic editor

use crate::item::ItemId;
use crate::operation::OperationId;
use survey_model::{ElementId, ModelError};
use thiserror::Error;

pub type LogicResult<T> = Result<T, LogicError>;

#[derive(Error, Debug)]
pub enum LogicError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("No logic item is being edited")]
    NoEditableItem,

    #[error("Logic item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Operation not found: {0}")]
    OperationNotFound(OperationId),

    #[error("Unknown logic type: {0}")]
    UnknownLogicType(String),

    #[error("Logic type {0} does not pick existing elements")]
    NoItemSelector(&'static str),

    #[error("Element {element} is not a {base_class}")]
    ElementNotApplicable {
        element: ElementId,
        base_class: &'static str,
    },

    #[error("Element {element} already has {property} set by another rule")]
    ElementAlreadyBound {
        element: ElementId,
        property: &'static str,
    },

    #[error("Survey logic is read-only")]
    ReadOnly,
}
