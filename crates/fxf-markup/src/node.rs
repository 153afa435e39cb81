//! Markup node kinds

use indexmap::IndexMap;

use crate::XmlId;

/// A single node in the markup tree
#[derive(Debug, Clone)]
pub struct XmlNode {
    /// Parent node (None for the root and for detached nodes)
    pub(crate) parent: Option<XmlId>,
    /// Node-specific data
    pub(crate) data: XmlData,
}

impl XmlNode {
    pub fn parent(&self) -> Option<XmlId> {
        self.parent
    }

    pub fn data(&self) -> &XmlData {
        &self.data
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, XmlData::Element(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            XmlData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            XmlData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            XmlData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum XmlData {
    /// Element with attributes and ordered children
    Element(ElementData),
    /// Text run (whitespace runs between elements are preserved)
    Text(String),
    /// Comment
    Comment(String),
    /// Processing instruction, e.g. `<?import forge.controls.Button?>`
    ProcessingInstruction { target: String, data: String },
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name as written, prefix included (`fx:include` stays one string)
    pub name: String,
    /// Attributes in first-insertion order
    attributes: IndexMap<String, String>,
    /// Ordered children
    pub(crate) children: Vec<XmlId>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute, keeping the original position if it already exists
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    /// Attributes in serialization order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Ordered child ids
    pub fn children(&self) -> &[XmlId] {
        &self.children
    }
}
