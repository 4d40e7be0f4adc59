//! # Survey JSON
//!
//! Reads and writes the survey library's JSON document shape:
//!
//! ```json
//! {
//!   "pages": [{ "name": "page1", "elements": [{ "type": "text", "name": "q1" }] }],
//!   "triggers": [{ "type": "complete", "expression": "{q1} = 'stop'" }],
//!   "completedHtmlOnCondition": [{ "expression": "{q1} = 1", "html": "Bye" }],
//!   "calculatedValues": [{ "name": "total", "expression": "{q1} + 1" }]
//! }
//! ```
//!
//! Collection properties declared with an item class in the [`ClassRegistry`]
//! (`elements`, `validators`, `choices`, `columns`, ...) become child elements.
//! Everything else is kept as a raw property value.

use crate::class_registry::ClassRegistry;
use crate::element::{Element, ElementId};
use crate::error::{ModelError, ModelResult};
use crate::survey::{Survey, ELEMENTS};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// How the `type` tag of an element is written back
#[derive(Debug, Clone, Copy)]
enum TypeTag {
    Omit,
    Kind,
    /// `completetrigger` is written as `complete`
    StripSuffix(&'static str),
}

impl Survey {
    /// Parse a survey from JSON text
    pub fn from_json(source: &str) -> ModelResult<Self> {
        Self::from_value(serde_json::from_str(source)?)
    }

    pub fn from_value(value: Value) -> ModelResult<Self> {
        Self::from_value_with_classes(value, Arc::new(ClassRegistry::default()))
    }

    pub fn from_value_with_classes(value: Value, classes: Arc<ClassRegistry>) -> ModelResult<Self> {
        let Value::Object(mut root) = value else {
            return Err(ModelError::invalid_shape("survey JSON must be an object"));
        };

        let mut survey = Survey::with_classes(classes);

        match root.remove("pages") {
            Some(Value::Array(pages)) => {
                for page in pages {
                    let id = survey.load_element(page, "page")?;
                    survey.pages.push(id);
                }
            }
            Some(other) => {
                return Err(ModelError::invalid_shape(format!(
                    "\"pages\" must be an array, found {other}"
                )));
            }
            None => {
                // Flat surveys put their questions on one implicit page
                let flat = root.remove(ELEMENTS).or_else(|| root.remove("questions"));
                if let Some(elements) = flat {
                    let mut page = Map::new();
                    page.insert("name".to_string(), Value::from("page1"));
                    page.insert(ELEMENTS.to_string(), elements);
                    let id = survey.load_element(Value::Object(page), "page")?;
                    survey.pages.push(id);
                }
            }
        }

        survey.triggers = survey.load_list(&mut root, "triggers", "surveytrigger")?;
        survey.completed_html_on_condition =
            survey.load_list(&mut root, "completedHtmlOnCondition", "htmlconditionitem")?;
        survey.calculated_values =
            survey.load_list(&mut root, "calculatedValues", "calculatedvalue")?;
        survey.properties = root;

        debug!(
            pages = survey.pages.len(),
            elements = survey.elements.len(),
            triggers = survey.triggers.len(),
            "Loaded survey JSON"
        );

        Ok(survey)
    }

    /// Serialize the survey back into its JSON shape
    pub fn to_value(&self) -> Value {
        let mut root = self.properties.clone();

        if !self.pages.is_empty() {
            root.insert("pages".to_string(), self.list_value(&self.pages, TypeTag::Omit));
        }
        if !self.triggers.is_empty() {
            root.insert(
                "triggers".to_string(),
                self.list_value(&self.triggers, TypeTag::StripSuffix("trigger")),
            );
        }
        if !self.completed_html_on_condition.is_empty() {
            root.insert(
                "completedHtmlOnCondition".to_string(),
                self.list_value(&self.completed_html_on_condition, TypeTag::Omit),
            );
        }
        if !self.calculated_values.is_empty() {
            root.insert(
                "calculatedValues".to_string(),
                self.list_value(&self.calculated_values, TypeTag::Omit),
            );
        }

        Value::Object(root)
    }

    pub fn to_json_pretty(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }

    fn load_list(
        &mut self,
        root: &mut Map<String, Value>,
        key: &str,
        base: &str,
    ) -> ModelResult<Vec<ElementId>> {
        match root.remove(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(values)) => values
                .into_iter()
                .map(|value| self.load_element(value, base))
                .collect(),
            Some(other) => Err(ModelError::invalid_shape(format!(
                "\"{key}\" must be an array, found {other}"
            ))),
        }
    }

    /// Load one element declared as `base` (its `type` tag may refine the kind)
    fn load_element(&mut self, value: Value, base: &str) -> ModelResult<ElementId> {
        let mut object = match value {
            Value::Object(object) => object,
            scalar @ (Value::String(_) | Value::Number(_) | Value::Bool(_))
                if base == "itemvalue" =>
            {
                let mut object = Map::new();
                object.insert("value".to_string(), scalar);
                object
            }
            other => {
                return Err(ModelError::invalid_shape(format!(
                    "expected an object for {base}, found {other}"
                )));
            }
        };

        let kind = match object.remove("type") {
            Some(Value::String(tag)) => self.resolve_kind(&tag, base),
            Some(other) => {
                return Err(ModelError::invalid_shape(format!(
                    "\"type\" must be a string, found {other}"
                )));
            }
            None => base.to_string(),
        };

        let mut element = Element::new(kind.clone());
        for (key, value) in object {
            let key = if key == "questions" && self.classes.is_kind_of(&kind, "panelbase") {
                ELEMENTS.to_string()
            } else {
                key
            };

            let item_class = self
                .classes
                .find_property(&kind, &key)
                .and_then(|decl| decl.class_name.clone());

            match (item_class, value) {
                (Some(item_class), Value::Array(children)) => {
                    element.ensure_collection(&key);
                    for child in children {
                        let child = self.load_element(child, &item_class)?;
                        element.push_child(&key, child);
                    }
                }
                (_, value) => element.set_value(&key, value),
            }
        }

        if self.classes.is_kind_of(&kind, "panelbase") {
            element.ensure_collection(ELEMENTS);
        }

        Ok(self.insert_element(element))
    }

    /// `complete` declared as a trigger resolves to `completetrigger`,
    /// `expression` declared as a validator to `expressionvalidator`
    fn resolve_kind(&self, tag: &str, base: &str) -> String {
        for suffix in ["trigger", "validator"] {
            if base.ends_with(suffix) && !tag.ends_with(suffix) {
                let candidate = format!("{tag}{suffix}");
                if self.classes.is_kind_of(&candidate, base) {
                    return candidate;
                }
            }
        }
        tag.to_string()
    }

    fn list_value(&self, ids: &[ElementId], tag: TypeTag) -> Value {
        Value::Array(ids.iter().map(|&id| self.element_value(id, tag)).collect())
    }

    fn element_value(&self, id: ElementId, tag: TypeTag) -> Value {
        let Some(element) = self.element(id) else {
            return Value::Null;
        };

        let mut object = Map::new();
        match tag {
            TypeTag::Omit => {}
            TypeTag::Kind => {
                object.insert("type".to_string(), Value::from(element.kind()));
            }
            TypeTag::StripSuffix(suffix) => {
                let kind = element.kind();
                let tag = kind.strip_suffix(suffix).filter(|t| !t.is_empty()).unwrap_or(kind);
                object.insert("type".to_string(), Value::from(tag));
            }
        }
        for (key, value) in element.properties() {
            object.insert(key.clone(), value.clone());
        }

        for (name, children) in element.collections() {
            let child_tag = match name {
                ELEMENTS => TypeTag::Kind,
                "validators" => TypeTag::StripSuffix("validator"),
                _ => TypeTag::Omit,
            };
            object.insert(name.to_string(), self.list_value(children, child_tag));
        }

        // Plain choices round-trip as plain values
        if element.kind() == "itemvalue" && object.len() == 1 {
            if let Some(value) = object.remove("value") {
                return value;
            }
        }

        Value::Object(object)
    }
}

impl Serialize for Survey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Survey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Survey::from_value(value).map_err(D::Error::custom)
    }
}
