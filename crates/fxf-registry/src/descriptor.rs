//! Type descriptors and name resolution

use indexmap::IndexMap;

use crate::runtime::{ObjId, RuntimeGraph, Value};
use crate::TypeId;

/// How a property holds its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Single text-coercible value
    Value,
    /// Single object-valued slot (accessory slots like `content`, `graphic`)
    Handle,
    /// Ordered object sequence (`children`, `items`)
    List,
}

/// Per-property metadata
#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub kind: PropertyKind,
    /// Value flows from the laid-out runtime object back into the document
    /// after a refresh (divider positions and the like)
    pub layout_synced: bool,
    /// Value applied at construction time when the markup names none
    pub default_value: Option<String>,
}

impl PropertySpec {
    fn new(kind: PropertyKind) -> Self {
        Self {
            kind,
            layout_synced: false,
            default_value: None,
        }
    }
}

/// A constructible type known to the registry
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Dotted qualified name as it appears in import directives
    pub qualified_name: String,
    /// Trailing segment of the qualified name, as used in element tags
    pub simple_name: String,
    /// Declared properties in declaration order
    pub properties: IndexMap<String, PropertySpec>,
    /// Property that collects unnamed child elements
    pub default_property: Option<String>,
    /// Container accepts free-form child positioning
    pub accepts_free_children: bool,
    /// Owning-window type whose content is detached for editor display
    pub window_like: bool,
    /// Sequence type; element children are items rather than properties
    pub collection_like: bool,
    /// Attached properties this class contributes to other instances,
    /// looked up through a `Class.property` qualifier
    pub attached: IndexMap<String, PropertySpec>,
}

impl TypeDescriptor {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let simple_name = qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(qualified_name.as_str())
            .to_string();
        Self {
            qualified_name,
            simple_name,
            properties: IndexMap::new(),
            default_property: None,
            accepts_free_children: false,
            window_like: false,
            collection_like: false,
            attached: IndexMap::new(),
        }
    }

    /// Package portion of the qualified name, empty for bare names
    pub fn package(&self) -> &str {
        match self.qualified_name.rfind('.') {
            Some(dot) => &self.qualified_name[..dot],
            None => "",
        }
    }

    pub fn value_property(mut self, name: &str) -> Self {
        self.properties.insert(name.to_string(), PropertySpec::new(PropertyKind::Value));
        self
    }

    pub fn value_property_with_default(mut self, name: &str, default: &str) -> Self {
        let mut spec = PropertySpec::new(PropertyKind::Value);
        spec.default_value = Some(default.to_string());
        self.properties.insert(name.to_string(), spec);
        self
    }

    pub fn layout_synced_property(mut self, name: &str) -> Self {
        let mut spec = PropertySpec::new(PropertyKind::Value);
        spec.layout_synced = true;
        self.properties.insert(name.to_string(), spec);
        self
    }

    pub fn handle_property(mut self, name: &str) -> Self {
        self.properties.insert(name.to_string(), PropertySpec::new(PropertyKind::Handle));
        self
    }

    pub fn list_property(mut self, name: &str) -> Self {
        self.properties.insert(name.to_string(), PropertySpec::new(PropertyKind::List));
        self
    }

    pub fn default_property(mut self, name: &str) -> Self {
        self.default_property = Some(name.to_string());
        self
    }

    pub fn free_children(mut self) -> Self {
        self.accepts_free_children = true;
        self
    }

    pub fn window_like(mut self) -> Self {
        self.window_like = true;
        self
    }

    pub fn collection(mut self) -> Self {
        self.collection_like = true;
        self
    }

    pub fn attached_property(mut self, name: &str) -> Self {
        self.attached.insert(name.to_string(), PropertySpec::new(PropertyKind::Value));
        self
    }
}

/// One import directive, as parsed from the document header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// `<?import forge.controls.Button?>`
    Type(String),
    /// `<?import forge.controls.*?>`
    Package(String),
}

impl Import {
    /// Parse the payload of an import directive
    pub fn parse(directive: &str) -> Self {
        match directive.strip_suffix(".*") {
            Some(package) => Import::Package(package.to_string()),
            None => Import::Type(directive.to_string()),
        }
    }
}

/// The registry: a closed table of constructible types
#[derive(Debug, Default)]
pub struct Registry {
    descriptors: Vec<TypeDescriptor>,
    by_qualified_name: IndexMap<String, TypeId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; later registrations win for the same name
    pub fn register(&mut self, descriptor: TypeDescriptor) -> TypeId {
        let id = TypeId(self.descriptors.len() as u32);
        self.by_qualified_name.insert(descriptor.qualified_name.clone(), id);
        self.descriptors.push(descriptor);
        id
    }

    pub fn descriptor(&self, id: TypeId) -> &TypeDescriptor {
        &self.descriptors[id.index()]
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Resolve a fully qualified name
    pub fn resolve_qualified(&self, qualified_name: &str) -> Option<TypeId> {
        self.by_qualified_name.get(qualified_name).copied()
    }

    /// Resolve a declared name against a set of import directives.
    ///
    /// A dotted name resolves directly; a simple name goes through explicit
    /// single-type imports first, then wildcard imports in order.
    pub fn resolve(&self, name: &str, imports: &[Import]) -> Option<TypeId> {
        if name.contains('.') {
            return self.resolve_qualified(name);
        }
        for import in imports {
            match import {
                Import::Type(qualified) => {
                    if qualified.rsplit('.').next() == Some(name) {
                        if let Some(id) = self.resolve_qualified(qualified) {
                            return Some(id);
                        }
                    }
                }
                Import::Package(package) => {
                    if let Some(id) = self.resolve_qualified(&format!("{package}.{name}")) {
                        return Some(id);
                    }
                }
            }
        }
        None
    }

    /// Residence descriptor for a `Class.property` qualified property name
    pub fn resolve_attached(
        &self,
        residence: &str,
        property: &str,
        imports: &[Import],
    ) -> Option<(TypeId, &PropertySpec)> {
        let id = self.resolve(residence, imports)?;
        let spec = self.descriptor(id).attached.get(property)?;
        Some((id, spec))
    }

    /// Construct a runtime object for a type, applying declared defaults
    pub fn construct(&self, id: TypeId, graph: &mut RuntimeGraph) -> ObjId {
        let descriptor = self.descriptor(id);
        let obj = graph.create(id);
        for (name, spec) in &descriptor.properties {
            match spec.kind {
                PropertyKind::List => {
                    graph.set_value(obj, name, Value::List(Vec::new()));
                }
                PropertyKind::Value => {
                    if let Some(default) = &spec.default_value {
                        graph.set_value(obj, name, Value::Text(default.clone()));
                    }
                }
                PropertyKind::Handle => {}
            }
        }
        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(TypeDescriptor::new("forge.controls.Button").value_property("text"));
        registry.register(TypeDescriptor::new("forge.layout.VBox").list_property("children"));
        registry
    }

    #[test]
    fn test_resolve_qualified_name() {
        let registry = registry();
        assert!(registry.resolve("forge.controls.Button", &[]).is_some());
        assert!(registry.resolve("forge.controls.Missing", &[]).is_none());
    }

    #[test]
    fn test_resolve_through_type_import() {
        let registry = registry();
        let imports = vec![Import::Type("forge.controls.Button".to_string())];
        assert!(registry.resolve("Button", &imports).is_some());
        assert!(registry.resolve("VBox", &imports).is_none());
    }

    #[test]
    fn test_resolve_through_wildcard_import() {
        let registry = registry();
        let imports = vec![Import::Package("forge.layout".to_string())];
        assert!(registry.resolve("VBox", &imports).is_some());
        assert!(registry.resolve("Button", &imports).is_none());
    }

    #[test]
    fn test_import_parse() {
        assert_eq!(
            Import::parse("forge.controls.*"),
            Import::Package("forge.controls".to_string())
        );
        assert_eq!(
            Import::parse("forge.controls.Button"),
            Import::Type("forge.controls.Button".to_string())
        );
    }

    #[test]
    fn test_construct_applies_defaults() {
        let mut registry = Registry::new();
        let id = registry.register(
            TypeDescriptor::new("forge.layout.SplitPane")
                .list_property("items")
                .value_property_with_default("orientation", "HORIZONTAL"),
        );
        let mut graph = RuntimeGraph::new();
        let obj = registry.construct(id, &mut graph);
        assert_eq!(
            graph.value(obj, "orientation"),
            Some(&Value::Text("HORIZONTAL".to_string()))
        );
        assert_eq!(graph.value(obj, "items"), Some(&Value::List(Vec::new())));
    }
}
