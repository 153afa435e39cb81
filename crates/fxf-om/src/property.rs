//! Object model properties

use std::fmt;

use fxf_markup::XmlId;

use crate::FxomId;

/// A property name, optionally qualified by the residence class of an
/// attached property (`GridPane.rowIndex` lives on GridPane, applies to a
/// child instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyName {
    /// Residence class as written, for attached properties
    pub residence: Option<String>,
    pub name: String,
}

impl PropertyName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            residence: None,
            name: name.into(),
        }
    }

    pub fn attached(residence: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            residence: Some(residence.into()),
            name: name.into(),
        }
    }

    /// Parse a markup attribute or tag name (`text`, `GridPane.rowIndex`)
    pub fn parse(raw: &str) -> Self {
        match raw.rsplit_once('.') {
            Some((residence, name))
                if residence.chars().next().is_some_and(char::is_uppercase) =>
            {
                Self::attached(residence, name)
            }
            _ => Self::new(raw),
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.residence {
            Some(residence) => write!(f, "{residence}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// How a property is stored in markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyStore {
    /// Attribute on the instance element
    Attribute,
    /// Dedicated property element
    Element(XmlId),
    /// Default property: content sits directly under the instance element
    Implicit,
}

/// A property value
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// Raw text, possibly a binding (`$x`) or handler (`#x`) marker
    Text(String),
    /// Ordered object values
    Objects(Vec<FxomId>),
}

/// A property of an instance (or hoisted intrinsic attribute)
#[derive(Debug, Clone)]
pub struct FxomProperty {
    pub name: PropertyName,
    /// Owning instance; absent while detached
    pub(crate) parent: Option<FxomId>,
    pub(crate) store: PropertyStore,
    pub value: PropertyValue,
    /// Qualified name of the residence class, resolved at creation time,
    /// feeding import computation
    pub residence_class: Option<String>,
}

impl FxomProperty {
    pub fn parent(&self) -> Option<FxomId> {
        self.parent
    }

    pub fn store(&self) -> PropertyStore {
        self.store
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            PropertyValue::Text(t) => Some(t),
            PropertyValue::Objects(_) => None,
        }
    }

    pub fn objects(&self) -> &[FxomId] {
        match &self.value {
            PropertyValue::Objects(objects) => objects,
            PropertyValue::Text(_) => &[],
        }
    }
}
