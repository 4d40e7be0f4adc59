//! # Survey Model
//!
//! In-memory survey document used by the logic editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ ClassRegistry: kind hierarchy + schema      │
//! │  - "checkbox" → "selectbase" → "question"   │
//! │  - "choices" declared as itemvalue[]        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Survey: element arena + document lists      │
//! │  - pages → panels → questions               │
//! │  - triggers, thank-you conditions,          │
//! │    calculated values                        │
//! └─────────────────────────────────────────────┘
//!                     ↕
//! ┌─────────────────────────────────────────────┐
//! │ JSON: survey library document shape         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use survey_model::Survey;
//!
//! let mut survey = Survey::new();
//! let page = survey.add_page("page1");
//! let q1 = survey.add_question(page, "text", "q1")?;
//! survey.set_property(q1, "visibleIf", "{q2} = 1")?;
//!
//! let json = survey.to_json_pretty()?;
//! ```

mod class_registry;
mod element;
mod error;
mod json;
mod survey;

pub use class_registry::{ClassInfo, ClassRegistry, PropertyDecl, BASE_CLASS};
pub use element::{is_value_empty, Element, ElementId};
pub use error::{ModelError, ModelResult};
pub use survey::{Survey, ELEMENTS};
