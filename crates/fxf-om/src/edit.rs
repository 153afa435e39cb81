//! Structural editing operations
//!
//! Every operation keeps the object model and the markup tree in lockstep.
//! The runtime graph is not touched here; it is rebuilt by the refresh that
//! closes the enclosing update scope.

use fxf_markup::XmlId;

use crate::document::FxomDocument;
use crate::ids;
use crate::loader;
use crate::object::{FxomData, FxomNode, FxomParent, InstanceData};
use crate::property::{FxomProperty, PropertyName, PropertyStore, PropertyValue};
use crate::{FxomError, FxomId, FxomResult, PropId};

impl FxomDocument {
    /// Create a detached instance of a registered type
    pub fn new_instance(&mut self, qualified_name: &str) -> FxomResult<FxomId> {
        let type_id = self
            .registry
            .resolve_qualified(qualified_name)
            .ok_or_else(|| FxomError::UnresolvableType(qualified_name.to_string()))?;
        let simple_name = self.registry.descriptor(type_id).simple_name.clone();
        let element = self.markup.tree_mut().create_element(simple_name.clone());
        let registry = std::sync::Arc::clone(&self.registry);
        let runtime = registry.construct(type_id, &mut self.runtime);
        Ok(self.alloc_node(FxomNode {
            element,
            runtime: Some(runtime),
            parent: None,
            data: FxomData::Instance(InstanceData {
                declared_name: simple_name,
                type_id: Some(type_id),
                properties: indexmap::IndexMap::new(),
            }),
        }))
    }

    /// Set a text property, creating an attribute-backed property when the
    /// instance does not carry it yet
    pub fn set_text_property(
        &mut self,
        instance: FxomId,
        name: PropertyName,
        value: impl Into<String>,
    ) -> FxomResult<()> {
        let value = value.into();
        let existing = self
            .node(instance)
            .ok_or(FxomError::UnknownObject)?
            .as_instance()
            .ok_or(FxomError::NotAnInstance)?
            .properties
            .get(&name)
            .copied();

        match existing {
            Some(prop) => {
                if self.property(prop).is_some_and(|p| p.text().is_none()) {
                    return Err(FxomError::NotATextProperty(name.to_string()));
                }
                sync_text_property(self, prop, value)
            }
            None => {
                let element = self.nodes[instance.index()].element;
                let imports = loader::header_imports(self);
                let residence_class = name.residence.as_deref().and_then(|residence| {
                    self.registry
                        .resolve(residence, &imports)
                        .map(|t| self.registry.descriptor(t).qualified_name.clone())
                });
                if let Some(e) = self.markup.tree_mut().element_mut(element) {
                    e.set_attribute(name.to_string(), value.clone());
                }
                let prop = self.alloc_property(FxomProperty {
                    name: name.clone(),
                    parent: Some(instance),
                    store: PropertyStore::Attribute,
                    value: PropertyValue::Text(value),
                    residence_class,
                });
                if let FxomData::Instance(data) = &mut self.nodes[instance.index()].data {
                    data.properties.insert(name, prop);
                }
                Ok(())
            }
        }
    }

    /// Remove a property from an instance. Removed object values are left
    /// detached in the document for re-attachment or disposal.
    pub fn remove_property(&mut self, instance: FxomId, name: &PropertyName) -> FxomResult<()> {
        let prop = self
            .node(instance)
            .ok_or(FxomError::UnknownObject)?
            .as_instance()
            .ok_or(FxomError::NotAnInstance)?
            .properties
            .get(name)
            .copied();
        let Some(prop) = prop else { return Ok(()) };

        let owner_element = self.nodes[instance.index()].element;
        let store = self.properties[prop.index()].store;
        let objects = self.properties[prop.index()].objects().to_vec();
        for object in &objects {
            let object_element = self.nodes[object.index()].element;
            self.markup.tree_mut().detach(object_element)?;
            self.nodes[object.index()].parent = None;
        }
        match store {
            PropertyStore::Attribute => {
                if let Some(e) = self.markup.tree_mut().element_mut(owner_element) {
                    e.remove_attribute(&name.to_string());
                }
            }
            PropertyStore::Element(element) => {
                self.markup.tree_mut().detach(element)?;
            }
            PropertyStore::Implicit => {
                if objects.is_empty() {
                    remove_text_children(self, owner_element)?;
                }
            }
        }
        self.properties[prop.index()].parent = None;
        if let FxomData::Instance(data) = &mut self.nodes[instance.index()].data {
            data.properties.shift_remove(name);
        }
        Ok(())
    }

    /// Insert a detached object into an instance property at an index,
    /// creating the property when missing
    pub fn insert_object(
        &mut self,
        child: FxomId,
        parent: FxomId,
        name: PropertyName,
        index: usize,
    ) -> FxomResult<()> {
        if self.node(child).ok_or(FxomError::UnknownObject)?.parent.is_some() {
            return Err(FxomError::StillAttached);
        }
        let existing = self
            .node(parent)
            .ok_or(FxomError::UnknownObject)?
            .as_instance()
            .ok_or(FxomError::NotAnInstance)?
            .properties
            .get(&name)
            .copied();
        let child_element = self.nodes[child.index()].element;

        let prop = match existing {
            Some(prop) => {
                let values = match &self.properties[prop.index()].value {
                    PropertyValue::Objects(objects) => objects.clone(),
                    PropertyValue::Text(_) => {
                        return Err(FxomError::NotAnObjectProperty(name.to_string()));
                    }
                };
                if index > values.len() {
                    return Err(FxomError::IndexOutOfBounds {
                        index,
                        len: values.len(),
                    });
                }
                let container = match self.properties[prop.index()].store {
                    PropertyStore::Element(element) => element,
                    PropertyStore::Implicit => self.nodes[parent.index()].element,
                    PropertyStore::Attribute => {
                        return Err(FxomError::NotAnObjectProperty(name.to_string()));
                    }
                };
                let markup_index = markup_insert_index(self, container, &values, index);
                self.markup
                    .tree_mut()
                    .insert_child(container, markup_index, child_element)?;
                if let PropertyValue::Objects(objects) = &mut self.properties[prop.index()].value {
                    objects.insert(index, child);
                }
                prop
            }
            None => {
                if index > 0 {
                    return Err(FxomError::IndexOutOfBounds { index, len: 0 });
                }
                let parent_element = self.nodes[parent.index()].element;
                let is_default = self
                    .nodes[parent.index()]
                    .as_instance()
                    .and_then(|i| i.type_id)
                    .and_then(|t| self.registry.descriptor(t).default_property.clone())
                    .is_some_and(|d| name.residence.is_none() && d == name.name);
                let store = if is_default {
                    let end = self.markup.tree().children(parent_element).len();
                    self.markup
                        .tree_mut()
                        .insert_child(parent_element, end, child_element)?;
                    PropertyStore::Implicit
                } else {
                    let property_element =
                        self.markup.tree_mut().create_element(name.to_string());
                    self.markup
                        .tree_mut()
                        .append_child(parent_element, property_element)?;
                    self.markup
                        .tree_mut()
                        .append_child(property_element, child_element)?;
                    PropertyStore::Element(property_element)
                };
                let prop = self.alloc_property(FxomProperty {
                    name: name.clone(),
                    parent: Some(parent),
                    store,
                    value: PropertyValue::Objects(vec![child]),
                    residence_class: None,
                });
                if let FxomData::Instance(data) = &mut self.nodes[parent.index()].data {
                    data.properties.insert(name, prop);
                }
                prop
            }
        };
        self.nodes[child.index()].parent = Some(FxomParent::Property(prop));
        Ok(())
    }

    /// Insert a detached object into a collection at an index
    pub fn insert_into_collection(
        &mut self,
        child: FxomId,
        collection: FxomId,
        index: usize,
    ) -> FxomResult<()> {
        if self.node(child).ok_or(FxomError::UnknownObject)?.parent.is_some() {
            return Err(FxomError::StillAttached);
        }
        let items = self
            .node(collection)
            .ok_or(FxomError::UnknownObject)?
            .as_collection()
            .ok_or(FxomError::NotACollection)?
            .items
            .clone();
        if index > items.len() {
            return Err(FxomError::IndexOutOfBounds {
                index,
                len: items.len(),
            });
        }
        let container = self.nodes[collection.index()].element;
        let child_element = self.nodes[child.index()].element;
        let markup_index = markup_insert_index(self, container, &items, index);
        self.markup
            .tree_mut()
            .insert_child(container, markup_index, child_element)?;
        if let FxomData::Collection(data) = &mut self.nodes[collection.index()].data {
            data.items.insert(index, child);
        }
        self.nodes[child.index()].parent = Some(FxomParent::Collection(collection));
        Ok(())
    }

    /// Detach an object from its parent property or collection. An empty
    /// object property left behind is dropped with its markup element.
    pub fn remove_object(&mut self, child: FxomId) -> FxomResult<()> {
        let parent = self.node(child).ok_or(FxomError::UnknownObject)?.parent;
        let Some(parent) = parent else { return Ok(()) };
        let child_element = self.nodes[child.index()].element;

        match parent {
            FxomParent::Property(prop) => {
                if let PropertyValue::Objects(objects) = &mut self.properties[prop.index()].value {
                    objects.retain(|&o| o != child);
                }
                self.markup.tree_mut().detach(child_element)?;
                let now_empty = self.properties[prop.index()].objects().is_empty();
                if now_empty {
                    let owner = self.properties[prop.index()].parent;
                    let prop_name = self.properties[prop.index()].name.clone();
                    if let PropertyStore::Element(element) = self.properties[prop.index()].store {
                        self.markup.tree_mut().detach(element)?;
                    }
                    self.properties[prop.index()].parent = None;
                    if let Some(owner) = owner {
                        if let FxomData::Instance(data) = &mut self.nodes[owner.index()].data {
                            data.properties.shift_remove(&prop_name);
                        }
                    }
                }
            }
            FxomParent::Collection(collection) => {
                if let FxomData::Collection(data) = &mut self.nodes[collection.index()].data {
                    data.items.retain(|&o| o != child);
                }
                self.markup.tree_mut().detach(child_element)?;
            }
        }
        self.nodes[child.index()].parent = None;
        Ok(())
    }

    /// Deep-copy a subtree within this document, returning the detached copy
    pub fn clone_object(&mut self, node: FxomId) -> FxomResult<FxomId> {
        let element = self.node(node).ok_or(FxomError::UnknownObject)?.element;
        let element_copy = self.markup.tree_mut().clone_subtree(element)?;
        let imports = loader::header_imports(self);
        loader::build_fragment(self, element_copy, imports)
    }

    /// Deep-copy a subtree from another document into this one, renaming
    /// any `fx:id` that would collide here. Declarations, `$id` binding
    /// expressions and intrinsic `source` references inside the adopted
    /// subtree follow the rename. The copy is returned detached.
    pub fn adopt_subtree(&mut self, source: &FxomDocument, node: FxomId) -> FxomResult<FxomId> {
        let element = source.node(node).ok_or(FxomError::UnknownObject)?.element;
        let element_copy = self
            .markup
            .tree_mut()
            .clone_subtree_from(source.markup.tree(), element)?;
        let imports = loader::header_imports(source);
        let adopted = loader::build_fragment(self, element_copy, imports)?;
        ids::rename_colliding_ids(self, adopted)?;
        Ok(adopted)
    }
}

/// Rewrite a text property's value in the object model and the markup
pub(crate) fn sync_text_property(
    doc: &mut FxomDocument,
    prop: PropId,
    value: String,
) -> FxomResult<()> {
    let name = doc.properties[prop.index()].name.clone();
    let owner = doc.properties[prop.index()].parent;
    let store = doc.properties[prop.index()].store;
    doc.properties[prop.index()].value = PropertyValue::Text(value.clone());
    match store {
        PropertyStore::Attribute => {
            let Some(owner) = owner else {
                return Ok(());
            };
            let element = doc.nodes[owner.index()].element;
            if let Some(e) = doc.markup.tree_mut().element_mut(element) {
                e.set_attribute(name.to_string(), value);
            }
        }
        PropertyStore::Element(element) => {
            remove_text_children(doc, element)?;
            let text = doc.markup.tree_mut().create_text(value);
            doc.markup.tree_mut().append_child(element, text)?;
        }
        PropertyStore::Implicit => {
            let Some(owner) = owner else {
                return Ok(());
            };
            let element = doc.nodes[owner.index()].element;
            remove_text_children(doc, element)?;
            let text = doc.markup.tree_mut().create_text(value);
            doc.markup.tree_mut().append_child(element, text)?;
        }
    }
    Ok(())
}

fn remove_text_children(doc: &mut FxomDocument, element: XmlId) -> FxomResult<()> {
    let children = doc.markup.tree().children(element).to_vec();
    for child in children {
        let is_text = doc
            .markup
            .tree()
            .get(child)
            .is_some_and(|n| n.as_text().is_some());
        if is_text {
            doc.markup.tree_mut().detach(child)?;
        }
    }
    Ok(())
}

/// Markup child index corresponding to an object-value index, skipping the
/// whitespace runs interleaved between object elements
fn markup_insert_index(
    doc: &FxomDocument,
    container: XmlId,
    values: &[FxomId],
    index: usize,
) -> usize {
    if index == 0 {
        match values.first() {
            Some(&first) => {
                let first_element = doc.nodes[first.index()].element;
                doc.markup
                    .tree()
                    .children(container)
                    .iter()
                    .position(|&c| c == first_element)
                    .unwrap_or(0)
            }
            None => doc.markup.tree().children(container).len(),
        }
    } else {
        let previous = values[index - 1];
        let previous_element = doc.nodes[previous.index()].element;
        doc.markup
            .tree()
            .children(container)
            .iter()
            .position(|&c| c == previous_element)
            .map(|p| p + 1)
            .unwrap_or_else(|| doc.markup.tree().children(container).len())
    }
}
