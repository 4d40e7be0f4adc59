//! # Class Registry
//!
//! Kind hierarchy and property schema of survey elements.
//!
//! Every element carries a kind tag (`text`, `page`, `setvaluetrigger`, ...).
//! The registry answers two questions about a kind:
//! - which kinds it inherits from (`checkbox` → `checkboxbase` → `selectbase` → `question`)
//! - how a property is declared on it (`choices` is an `itemvalue[]` on every `selectbase`)

use crate::element::Element;
use std::collections::HashMap;

/// Root of the hierarchy; ancestor walks stop here
pub const BASE_CLASS: &str = "base";

/// Declared shape of a property on a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,

    /// Declared property type (`itemvalue[]`, `matrixdropdowncolumns`, ...)
    pub type_name: String,

    /// Class of the items held by a collection property
    pub class_name: Option<String>,
}

/// One registered class
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub name: String,
    pub parent: Option<String>,
    pub properties: Vec<PropertyDecl>,
}

/// Registry of element classes
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassInfo>,
}

const SURVEY_CLASSES: &[(&str, Option<&str>)] = &[
    ("panelbase", None),
    ("page", Some("panelbase")),
    ("panel", Some("panelbase")),
    ("question", None),
    ("text", Some("question")),
    ("comment", Some("question")),
    ("boolean", Some("question")),
    ("rating", Some("question")),
    ("html", Some("question")),
    ("image", Some("question")),
    ("expression", Some("question")),
    ("file", Some("question")),
    ("multipletext", Some("question")),
    ("paneldynamic", Some("question")),
    ("signaturepad", Some("question")),
    ("selectbase", Some("question")),
    ("checkboxbase", Some("selectbase")),
    ("checkbox", Some("checkboxbase")),
    ("radiogroup", Some("checkboxbase")),
    ("imagepicker", Some("checkboxbase")),
    ("dropdown", Some("selectbase")),
    ("matrixbase", Some("question")),
    ("matrix", Some("matrixbase")),
    ("matrixdropdownbase", Some("matrixbase")),
    ("matrixdropdown", Some("matrixdropdownbase")),
    ("matrixdynamic", Some("matrixdropdownbase")),
    ("trigger", None),
    ("surveytrigger", Some("trigger")),
    ("visibletrigger", Some("surveytrigger")),
    ("completetrigger", Some("surveytrigger")),
    ("setvaluetrigger", Some("surveytrigger")),
    ("copyvaluetrigger", Some("surveytrigger")),
    ("skiptrigger", Some("surveytrigger")),
    ("runexpressiontrigger", Some("surveytrigger")),
    ("expressionitem", None),
    ("htmlconditionitem", Some("expressionitem")),
    ("urlconditionitem", Some("expressionitem")),
    ("calculatedvalue", None),
    ("itemvalue", None),
    ("matrixdropdowncolumn", None),
    ("surveyvalidator", None),
    ("numericvalidator", Some("surveyvalidator")),
    ("textvalidator", Some("surveyvalidator")),
    ("answercountvalidator", Some("surveyvalidator")),
    ("regexvalidator", Some("surveyvalidator")),
    ("emailvalidator", Some("surveyvalidator")),
    ("expressionvalidator", Some("surveyvalidator")),
];

// (class, property, declared type, item class)
const SURVEY_PROPERTIES: &[(&str, &str, &str, Option<&str>)] = &[
    ("panelbase", "elements", "elements", Some("question")),
    ("question", "validators", "validators", Some("surveyvalidator")),
    ("selectbase", "choices", "itemvalue[]", Some("itemvalue")),
    ("matrix", "columns", "itemvalue[]", Some("itemvalue")),
    ("matrix", "rows", "itemvalue[]", Some("itemvalue")),
    ("matrixdropdownbase", "columns", "matrixdropdowncolumns", Some("matrixdropdowncolumn")),
    ("matrixdropdown", "rows", "itemvalue[]", Some("itemvalue")),
];

impl ClassRegistry {
    /// Registry without any class
    pub fn empty() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// Registry with the survey library's element classes
    pub fn survey_classes() -> Self {
        let mut registry = Self::empty();
        for (name, parent) in SURVEY_CLASSES {
            registry.add_class(name, *parent);
        }
        for (class, name, type_name, class_name) in SURVEY_PROPERTIES {
            registry.add_property(
                class,
                PropertyDecl {
                    name: name.to_string(),
                    type_name: type_name.to_string(),
                    class_name: class_name.map(str::to_string),
                },
            );
        }
        registry
    }

    /// Register (or replace) a class
    pub fn add_class(&mut self, name: &str, parent: Option<&str>) {
        self.classes.insert(
            name.to_string(),
            ClassInfo {
                name: name.to_string(),
                parent: parent.map(str::to_string),
                properties: Vec::new(),
            },
        );
    }

    /// Declare a property on a registered class. Returns false for unknown classes.
    pub fn add_property(&mut self, class: &str, decl: PropertyDecl) -> bool {
        match self.classes.get_mut(class) {
            Some(info) => {
                info.properties.retain(|p| p.name != decl.name);
                info.properties.push(decl);
                true
            }
            None => false,
        }
    }

    pub fn find_class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn parent_of(&self, kind: &str) -> Option<&str> {
        self.find_class(kind)?.parent.as_deref()
    }

    /// The kind itself followed by its ancestors.
    ///
    /// Stops at [`BASE_CLASS`] or at the first kind the registry does not know.
    pub fn ancestors<'a>(&'a self, kind: &'a str) -> Vec<&'a str> {
        let mut kinds = vec![kind];
        let mut current = kind;
        while current != BASE_CLASS {
            let Some(parent) = self.parent_of(current) else {
                break;
            };
            if kinds.contains(&parent) {
                break;
            }
            kinds.push(parent);
            current = parent;
        }
        kinds
    }

    pub fn is_kind_of(&self, kind: &str, base: &str) -> bool {
        self.ancestors(kind).contains(&base)
    }

    /// Look a property up on the kind or the closest ancestor declaring it
    pub fn find_property(&self, kind: &str, name: &str) -> Option<&PropertyDecl> {
        self.ancestors(kind).into_iter().find_map(|class| {
            self.find_class(class)?
                .properties
                .iter()
                .find(|decl| decl.name == name)
        })
    }

    /// Construct a blank element of a registered kind
    pub fn create(&self, kind: &str) -> Option<Element> {
        self.contains(kind).then(|| Element::new(kind))
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::survey_classes()
    }
}
