//! Runtime object graph (arena-based allocation)
//!
//! The constructed counterpart of the document model. Each document owns
//! exactly one graph; a refresh builds a fresh graph and the document adopts
//! it wholesale, so stale handles never cross graphs.

use indexmap::IndexMap;

use crate::TypeId;

/// Runtime object identifier (index into graph arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub(crate) u32);

impl ObjId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A constructed runtime object
#[derive(Debug, Clone)]
pub struct RuntimeObject {
    pub type_id: TypeId,
    values: IndexMap<String, Value>,
}

impl RuntimeObject {
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A runtime property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Object(ObjId),
    List(Vec<ObjId>),
}

/// Arena of runtime objects
#[derive(Debug, Default)]
pub struct RuntimeGraph {
    objects: Vec<RuntimeObject>,
}

impl RuntimeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn create(&mut self, type_id: TypeId) -> ObjId {
        let id = ObjId(self.objects.len() as u32);
        self.objects.push(RuntimeObject {
            type_id,
            values: IndexMap::new(),
        });
        id
    }

    pub fn get(&self, id: ObjId) -> Option<&RuntimeObject> {
        self.objects.get(id.index())
    }

    pub fn value(&self, id: ObjId, name: &str) -> Option<&Value> {
        self.get(id).and_then(|obj| obj.values.get(name))
    }

    pub fn set_value(&mut self, id: ObjId, name: &str, value: Value) {
        if let Some(obj) = self.objects.get_mut(id.index()) {
            obj.values.insert(name.to_string(), value);
        }
    }

    pub fn remove_value(&mut self, id: ObjId, name: &str) -> Option<Value> {
        self.objects
            .get_mut(id.index())
            .and_then(|obj| obj.values.shift_remove(name))
    }

    /// Append an object to a list-valued property, creating the list on
    /// first use
    pub fn append_to_list(&mut self, id: ObjId, name: &str, item: ObjId) {
        let Some(obj) = self.objects.get_mut(id.index()) else {
            return;
        };
        match obj.values.get_mut(name) {
            Some(Value::List(items)) => items.push(item),
            _ => {
                obj.values.insert(name.to_string(), Value::List(vec![item]));
            }
        }
    }

    /// Deep-copy an object and everything reachable from it
    pub fn deep_copy(&mut self, id: ObjId) -> ObjId {
        let Some(source) = self.get(id).cloned() else {
            return id;
        };
        let copy = self.create(source.type_id);
        for (name, value) in source.values {
            let copied = match value {
                Value::Text(text) => Value::Text(text),
                Value::Object(child) => Value::Object(self.deep_copy(child)),
                Value::List(items) => {
                    Value::List(items.into_iter().map(|item| self.deep_copy(item)).collect())
                }
            };
            self.set_value(copy, &name, copied);
        }
        copy
    }

    /// Space-separated style class list, the implicit styling hook the
    /// rendering layer keys on
    pub fn style_classes(&self, id: ObjId) -> Vec<String> {
        match self.value(id, "styleClass") {
            Some(Value::Text(classes)) => {
                classes.split_whitespace().map(str::to_string).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Add a style class if not already present
    pub fn ensure_style_class(&mut self, id: ObjId, class: &str) {
        let mut classes = self.style_classes(id);
        if classes.iter().any(|c| c == class) {
            return;
        }
        classes.push(class.to_string());
        self.set_value(id, "styleClass", Value::Text(classes.join(" ")));
    }
}
