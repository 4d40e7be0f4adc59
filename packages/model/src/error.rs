//! Error types for the survey model

use crate::element::ElementId;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid survey JSON: {0}")]
    InvalidShape(String),

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Unknown class: {0}")]
    UnknownClass(String),
}

impl ModelError {
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape(message.into())
    }
}
