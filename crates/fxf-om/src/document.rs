//! FXOM document - the root owner
//!
//! Owns the markup document, the object/property arenas, the runtime graph
//! and the revision counters. All mutation happens on one designated
//! application thread; the update scoping exists to batch edits, not to
//! provide isolation.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use fxf_markup::XmlDocument;
use fxf_registry::{ObjId, Registry, RuntimeGraph};

use crate::loader;
use crate::object::{FxomData, FxomNode, FxomParent};
use crate::property::{FxomProperty, PropertyValue};
use crate::refresher;
use crate::saver::{self, SaveOptions};
use crate::{FxomError, FxomId, FxomResult, PropId};

/// Recognized-but-unconstructable load defects, reported through a callback
/// instead of failing the load. The document is left rootless; the caller
/// is expected to present a targeted message.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KnownError {
    #[error("Unresolvable charset on include: {charset}")]
    UnresolvableCharset { charset: String },
}

/// Callback receiving known-recoverable load defects
pub type KnownErrorHandler<'a> = dyn FnMut(&KnownError) + 'a;

/// The FXOM document
#[derive(Debug)]
pub struct FxomDocument {
    pub(crate) markup: XmlDocument,
    pub(crate) nodes: Vec<FxomNode>,
    pub(crate) properties: Vec<FxomProperty>,
    pub(crate) root: Option<FxomId>,
    pub(crate) registry: Arc<Registry>,
    pub(crate) runtime: RuntimeGraph,
    pub(crate) runtime_root: Option<ObjId>,
    /// Runtime subtree shown by the editor; for window-like roots this is
    /// the detached content, decoupled from the owning window
    pub(crate) display_node: Option<ObjId>,
    pub(crate) resources: Option<HashMap<String, String>>,
    pub(crate) location: Option<PathBuf>,
    scene_graph_revision: u64,
    style_revision: u64,
    update_depth: u32,
}

impl FxomDocument {
    /// Create an empty document (no root)
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            markup: XmlDocument::new(),
            nodes: Vec::new(),
            properties: Vec::new(),
            root: None,
            registry,
            runtime: RuntimeGraph::new(),
            runtime_root: None,
            display_node: None,
            resources: None,
            location: None,
            scene_graph_revision: 0,
            style_revision: 0,
            update_depth: 0,
        }
    }

    /// Load a document from markup text
    pub fn open(text: &str, registry: Arc<Registry>) -> FxomResult<Self> {
        Self::open_reporting(text, registry, None, None, &mut |_| {})
    }

    /// Load with a resource map for `%key` substitution and a filesystem
    /// location for include resolution
    pub fn open_with_resources(
        text: &str,
        registry: Arc<Registry>,
        resources: Option<HashMap<String, String>>,
        location: Option<PathBuf>,
    ) -> FxomResult<Self> {
        Self::open_reporting(text, registry, resources, location, &mut |_| {})
    }

    /// Load, routing known-recoverable defects to `on_known_error` instead
    /// of the error return. On a known defect the result is `Ok` with a
    /// rootless document.
    pub fn open_reporting(
        text: &str,
        registry: Arc<Registry>,
        resources: Option<HashMap<String, String>>,
        location: Option<PathBuf>,
        on_known_error: &mut KnownErrorHandler<'_>,
    ) -> FxomResult<Self> {
        let mut doc = Self::new(registry);
        doc.resources = resources;
        doc.location = location;
        loader::load(&mut doc, text, on_known_error)?;
        Ok(doc)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn markup(&self) -> &XmlDocument {
        &self.markup
    }

    pub fn location(&self) -> Option<&PathBuf> {
        self.location.as_ref()
    }

    pub fn root(&self) -> Option<FxomId> {
        self.root
    }

    pub fn runtime_root(&self) -> Option<ObjId> {
        self.runtime_root
    }

    pub fn display_node(&self) -> Option<ObjId> {
        self.display_node
    }

    pub fn runtime_graph(&self) -> &RuntimeGraph {
        &self.runtime
    }

    /// Incremented every time the runtime graph is rebuilt
    pub fn scene_graph_revision(&self) -> u64 {
        self.scene_graph_revision
    }

    /// Incremented every time stylesheets are reapplied
    pub fn style_revision(&self) -> u64 {
        self.style_revision
    }

    /// Reapply stylesheet-driven state: bumps the style revision and
    /// re-ensures the implicit `root` style class on the runtime root
    pub fn reapply_stylesheets(&mut self) {
        self.style_revision += 1;
        if let Some(root) = self.runtime_root {
            self.runtime.ensure_style_class(root, "root");
        }
    }

    pub fn node(&self, id: FxomId) -> Option<&FxomNode> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: FxomId) -> Option<&mut FxomNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn property(&self, id: PropId) -> Option<&FxomProperty> {
        self.properties.get(id.index())
    }

    pub(crate) fn property_mut(&mut self, id: PropId) -> Option<&mut FxomProperty> {
        self.properties.get_mut(id.index())
    }

    pub(crate) fn alloc_node(&mut self, node: FxomNode) -> FxomId {
        let id = FxomId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn alloc_property(&mut self, property: FxomProperty) -> PropId {
        let id = PropId(self.properties.len() as u32);
        self.properties.push(property);
        id
    }

    // ---------------------------------------------------------------- ids

    /// The object's `fx:id`, if any
    pub fn fx_id(&self, id: FxomId) -> Option<&str> {
        let element = self.node(id)?.element;
        self.markup.tree().element(element)?.attribute("fx:id")
    }

    /// Set or clear an object's `fx:id`. Assigning an id already used by a
    /// different object is rejected; ids are unique within a document at
    /// any instant.
    pub fn set_fx_id(&mut self, id: FxomId, fx_id: Option<&str>) -> FxomResult<()> {
        if let Some(new_id) = fx_id {
            if let Some(holder) = self.lookup_id(new_id) {
                if holder != id {
                    return Err(FxomError::DuplicateId(new_id.to_string()));
                }
            }
        }
        let element = self.node(id).ok_or(FxomError::UnknownObject)?.element;
        let element = self
            .markup
            .tree_mut()
            .element_mut(element)
            .ok_or(FxomError::UnknownObject)?;
        match fx_id {
            Some(fx_id) => element.set_attribute("fx:id", fx_id),
            None => {
                element.remove_attribute("fx:id");
            }
        }
        Ok(())
    }

    /// All `fx:id` declarations in document order
    pub fn collect_ids(&self) -> Vec<(String, FxomId)> {
        let mut ids = Vec::new();
        for id in self.descendants_of_root() {
            if let Some(fx_id) = self.fx_id(id) {
                ids.push((fx_id.to_string(), id));
            }
        }
        ids
    }

    /// Find the object declaring an `fx:id`
    pub fn lookup_id(&self, fx_id: &str) -> Option<FxomId> {
        self.descendants_of_root()
            .into_iter()
            .find(|&id| self.fx_id(id) == Some(fx_id))
    }

    /// First unused id derived from `base` (`button`, `button1`, ...)
    pub fn next_free_id(&self, base: &str) -> String {
        let used: BTreeSet<String> = self.collect_ids().into_iter().map(|(id, _)| id).collect();
        if !used.contains(base) {
            return base.to_string();
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{base}{n}");
            if !used.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    // -------------------------------------------------------------- walks

    /// Direct child objects in declaration order
    pub fn child_objects(&self, id: FxomId) -> Vec<FxomId> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        match &node.data {
            FxomData::Instance(instance) => instance
                .properties
                .values()
                .filter_map(|&prop| self.property(prop))
                .flat_map(|prop| prop.objects().iter().copied())
                .collect(),
            FxomData::Collection(collection) => collection.items.clone(),
            FxomData::Intrinsic(_) => Vec::new(),
        }
    }

    /// Pre-order walk of a subtree, including `from`
    pub fn descendants(&self, from: FxomId) -> Vec<FxomId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            let children = self.child_objects(id);
            for &child in children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    fn descendants_of_root(&self) -> Vec<FxomId> {
        match self.root {
            Some(root) => self.descendants(root),
            None => Vec::new(),
        }
    }

    /// Object at a path of child indices from the root
    pub fn object_at_path(&self, path: &[usize]) -> Option<FxomId> {
        let mut cursor = self.root?;
        for &index in path {
            cursor = self.child_objects(cursor).into_iter().nth(index)?;
        }
        Some(cursor)
    }

    /// Distinct declared classes of the root object and all descendants,
    /// plus the residence classes of attached properties in the subtree
    pub fn collect_declared_classes(&self) -> BTreeSet<String> {
        let mut classes = BTreeSet::new();
        for id in self.descendants_of_root() {
            let Some(node) = self.node(id) else { continue };
            let (type_id, properties) = match &node.data {
                FxomData::Instance(instance) => (instance.type_id, Some(&instance.properties)),
                FxomData::Collection(collection) => (collection.type_id, None),
                FxomData::Intrinsic(intrinsic) => (None, Some(&intrinsic.properties)),
            };
            if let Some(type_id) = type_id {
                classes.insert(self.registry.descriptor(type_id).qualified_name.clone());
            }
            if let Some(properties) = properties {
                for &prop in properties.values() {
                    if let Some(residence) =
                        self.property(prop).and_then(|p| p.residence_class.clone())
                    {
                        classes.insert(residence);
                    }
                }
            }
        }
        classes
    }

    /// Instances whose declared class resolves to `qualified_name`
    pub fn collect_instances_of(&self, qualified_name: &str) -> Vec<FxomId> {
        self.descendants_of_root()
            .into_iter()
            .filter(|&id| {
                self.node(id)
                    .and_then(|n| match &n.data {
                        FxomData::Instance(i) => i.type_id,
                        FxomData::Collection(c) => c.type_id,
                        FxomData::Intrinsic(_) => None,
                    })
                    .is_some_and(|t| self.registry.descriptor(t).qualified_name == qualified_name)
            })
            .collect()
    }

    /// All text values of properties with the given name across the document
    pub fn collect_property_values(&self, name: &str) -> Vec<(FxomId, String)> {
        let mut out = Vec::new();
        for id in self.descendants_of_root() {
            let Some(node) = self.node(id) else { continue };
            let properties = match &node.data {
                FxomData::Instance(instance) => &instance.properties,
                FxomData::Intrinsic(intrinsic) => &intrinsic.properties,
                FxomData::Collection(_) => continue,
            };
            for (prop_name, &prop) in properties {
                if prop_name.name == name {
                    if let Some(PropertyValue::Text(text)) =
                        self.property(prop).map(|p| &p.value)
                    {
                        out.push((id, text.clone()));
                    }
                }
            }
        }
        out
    }

    // --------------------------------------------------------- controller

    /// `fx:controller` of the root element
    pub fn controller_name(&self) -> Option<&str> {
        let root = self.root?;
        let element = self.node(root)?.element;
        self.markup.tree().element(element)?.attribute("fx:controller")
    }

    pub fn set_controller_name(&mut self, controller: Option<&str>) {
        let Some(root) = self.root else { return };
        let element = self.nodes[root.index()].element;
        if let Some(element) = self.markup.tree_mut().element_mut(element) {
            match controller {
                Some(controller) => element.set_attribute("fx:controller", controller),
                None => {
                    element.remove_attribute("fx:controller");
                }
            }
        }
    }

    // ------------------------------------------------------ update scope

    /// Open an update scope. Nested scopes coalesce; the refresh runs when
    /// the outermost scope closes.
    pub fn begin_update(&mut self) {
        self.update_depth += 1;
    }

    /// Close an update scope, refreshing when it was the outermost one
    pub fn end_update(&mut self) {
        debug_assert!(self.update_depth > 0, "unbalanced end_update");
        self.update_depth = self.update_depth.saturating_sub(1);
        if self.update_depth == 0 {
            self.refresh();
        }
    }

    /// Run a batch of edits in an update scope. Reentrant: nested calls
    /// bump the depth counter and only the outermost triggers the refresh.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_update();
        let result = f(self);
        self.end_update();
        result
    }

    pub fn update_depth(&self) -> u32 {
        self.update_depth
    }

    /// Rebuild the runtime graph from the current object model and
    /// reconcile it onto the stable node identities
    pub fn refresh(&mut self) {
        self.scene_graph_revision += 1;
        refresher::refresh(self);
    }

    /// Serialize to markup text
    pub fn save(&mut self, options: &SaveOptions) -> String {
        saver::save(self, options)
    }

    // -------------------------------------------------------------- root

    /// Replace the root object. The demoted root loses its root-only
    /// markup attributes (`fx:controller` and the namespace declarations).
    /// The new root must be detached.
    pub fn set_root(&mut self, new_root: Option<FxomId>) -> FxomResult<()> {
        if let Some(id) = new_root {
            let node = self.node(id).ok_or(FxomError::UnknownObject)?;
            if node.parent.is_some() {
                return Err(FxomError::StillAttached);
            }
        }
        if let Some(old) = self.root {
            if Some(old) != new_root {
                let element = self.nodes[old.index()].element;
                if let Some(element) = self.markup.tree_mut().element_mut(element) {
                    element.remove_attribute("fx:controller");
                    element.remove_attribute("xmlns");
                    element.remove_attribute("xmlns:fx");
                }
            }
        }
        self.root = new_root;
        let root_element = new_root.map(|id| self.nodes[id.index()].element);
        self.markup.set_root(root_element);
        Ok(())
    }

    /// Parent attachment of an object, if any
    pub fn parent_of(&self, id: FxomId) -> Option<FxomParent> {
        self.node(id).and_then(|n| n.parent)
    }
}
