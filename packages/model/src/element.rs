//! Survey elements and their arena identifiers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of an element inside one [`crate::Survey`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u32);

impl ElementId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the element in its survey's arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the survey document (page, panel, question, trigger, column, ...)
///
/// Scalar settings live in the property map. Child elements are referenced by
/// id from named collections (`elements`, `columns`, `validators`, `choices`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    kind: String,
    properties: Map<String, Value>,
    collections: BTreeMap<String, Vec<ElementId>>,
}

impl Element {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            properties: Map::new(),
            collections: BTreeMap::new(),
        }
    }

    /// Class tag of this element
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.property_str("name")
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Non-empty string property
    pub fn property_str(&self, name: &str) -> Option<&str> {
        match self.properties.get(name) {
            Some(Value::String(value)) if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    /// Scalar property rendered as text (strings verbatim, numbers and booleans formatted)
    pub fn property_text(&self, name: &str) -> Option<String> {
        match self.properties.get(name)? {
            Value::String(value) if !value.is_empty() => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            _ => None,
        }
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.properties
            .get(name)
            .is_some_and(|value| !is_value_empty(value))
    }

    /// Write a string property. An empty string clears it.
    pub fn set_property(&mut self, name: &str, value: &str) {
        self.set_value(name, Value::String(value.to_string()));
    }

    /// Write a raw property value. Empty values clear it.
    pub fn set_value(&mut self, name: &str, value: Value) {
        if is_value_empty(&value) {
            self.properties.remove(name);
        } else {
            self.properties.insert(name.to_string(), value);
        }
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Child ids of a named collection (empty when the collection is absent)
    pub fn collection(&self, name: &str) -> &[ElementId] {
        self.collections
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn collections(&self) -> impl Iterator<Item = (&str, &[ElementId])> {
        self.collections
            .iter()
            .map(|(name, children)| (name.as_str(), children.as_slice()))
    }

    pub(crate) fn push_child(&mut self, collection: &str, child: ElementId) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(child);
    }

    pub(crate) fn ensure_collection(&mut self, collection: &str) {
        self.collections.entry(collection.to_string()).or_default();
    }
}

/// `null`, `""`, `[]` and `{}` count as "no value"
pub fn is_value_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(value) => value.is_empty(),
        Value::Array(values) => values.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_string_clears_property() {
        let mut element = Element::new("text");
        element.set_property("visibleIf", "{q1} = 1");
        assert_eq!(element.property_str("visibleIf"), Some("{q1} = 1"));

        element.set_property("visibleIf", "");
        assert!(element.property("visibleIf").is_none());
        assert!(!element.has_value("visibleIf"));
    }

    #[test]
    fn test_property_text_formats_scalars() {
        let mut element = Element::new("setvaluetrigger");
        element.set_value("setValue", json!(5));
        element.set_value("isVariable", json!(false));

        assert_eq!(element.property_text("setValue"), Some("5".to_string()));
        assert_eq!(element.property_text("isVariable"), Some("false".to_string()));
        assert_eq!(element.property_str("setValue"), None);
    }

    #[test]
    fn test_missing_collection_is_empty() {
        let element = Element::new("page");
        assert!(element.collection("elements").is_empty());
    }
}
