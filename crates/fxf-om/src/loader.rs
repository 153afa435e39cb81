//! FXOM loader
//!
//! Walks the parsed markup tree and builds the object model and the runtime
//! graph together. Each element is gathered into a transient frame local to
//! its visit and converted into an immutable node as the element closes;
//! parser state travels through an explicit `LoaderState`, never a
//! struct-level cursor.

use std::path::PathBuf;
use std::sync::Arc;

use fxf_markup::{XmlData, XmlDocument, XmlId};
use fxf_registry::{Import, ObjId, PropertyKind, TypeId, Value};
use indexmap::IndexMap;

use crate::document::{FxomDocument, KnownError, KnownErrorHandler};
use crate::object::{
    CollectionData, FxomData, FxomNode, FxomParent, InstanceData, IntrinsicData, IntrinsicKind,
};
use crate::property::{FxomProperty, PropertyName, PropertyStore, PropertyValue};
use crate::{FxomError, FxomId, FxomResult, PropId};

const RESERVED_ATTRIBUTES: [&str; 5] =
    ["fx:id", "fx:value", "fx:constant", "fx:factory", "fx:controller"];

const RECOGNIZED_CHARSETS: [&str; 5] = ["utf-8", "utf-16", "us-ascii", "iso-8859-1", "latin-1"];

/// Load failure routing: fatal errors surface to the caller, known defects
/// go to the callback and leave the document rootless.
enum LoadAbort {
    Fatal(FxomError),
    Known(KnownError),
}

impl From<FxomError> for LoadAbort {
    fn from(e: FxomError) -> Self {
        LoadAbort::Fatal(e)
    }
}

type LoadResult<T> = Result<T, LoadAbort>;

/// Explicit parser state threaded through the walk
struct LoaderState {
    imports: Vec<Import>,
    /// Include files currently being expanded, for cycle protection
    include_stack: Vec<PathBuf>,
}

pub(crate) fn load(
    doc: &mut FxomDocument,
    text: &str,
    on_known_error: &mut KnownErrorHandler<'_>,
) -> FxomResult<()> {
    let markup = fxf_markup::parse(text).map_err(|e| FxomError::Load {
        message: e.to_string(),
        source: Some(e),
    })?;
    doc.markup = markup;

    let imports = doc
        .markup
        .header_instructions("import")
        .into_iter()
        .map(|(_, directive)| Import::parse(&directive))
        .collect();
    let mut state = LoaderState {
        imports,
        include_stack: Vec::new(),
    };

    let Some(root_element) = doc.markup.root() else {
        return Ok(());
    };

    match build_object(doc, &mut state, root_element) {
        Ok(root) => {
            install_root(doc, root);
            resolve_intrinsic_references(doc);
            tracing::debug!(
                objects = doc.nodes.len(),
                runtime = doc.runtime.len(),
                "loaded document"
            );
            Ok(())
        }
        Err(LoadAbort::Fatal(e)) => {
            clear_partial_load(doc);
            Err(e)
        }
        Err(LoadAbort::Known(known)) => {
            tracing::warn!(%known, "known load defect, document left rootless");
            clear_partial_load(doc);
            on_known_error(&known);
            Ok(())
        }
    }
}

/// Build an object node (and its runtime counterpart) for an adopted or
/// freshly created markup element. Used by the cross-document move path.
pub(crate) fn build_fragment(
    doc: &mut FxomDocument,
    element: XmlId,
    imports: Vec<Import>,
) -> FxomResult<FxomId> {
    let mut state = LoaderState {
        imports,
        include_stack: Vec::new(),
    };
    match build_object(doc, &mut state, element) {
        Ok(id) => Ok(id),
        Err(LoadAbort::Fatal(e)) => Err(e),
        Err(LoadAbort::Known(known)) => Err(FxomError::Load {
            message: known.to_string(),
            source: None,
        }),
    }
}

/// Import directives currently declared in a document's header
pub(crate) fn header_imports(doc: &FxomDocument) -> Vec<Import> {
    doc.markup
        .header_instructions("import")
        .into_iter()
        .map(|(_, directive)| Import::parse(&directive))
        .collect()
}

fn clear_partial_load(doc: &mut FxomDocument) {
    doc.nodes.clear();
    doc.properties.clear();
    doc.runtime = fxf_registry::RuntimeGraph::new();
    doc.root = None;
    doc.runtime_root = None;
    doc.display_node = None;
    doc.markup.set_root(None);
}

/// Install the fully built root: object root and runtime root change in one
/// step, and window-like roots hand their content to the display node.
fn install_root(doc: &mut FxomDocument, root: FxomId) {
    let runtime_root = doc.nodes[root.index()].runtime;
    doc.root = Some(root);
    doc.runtime_root = runtime_root;
    doc.display_node = runtime_root;

    let window_like = doc.nodes[root.index()]
        .as_instance()
        .and_then(|i| i.type_id)
        .is_some_and(|t| doc.registry.descriptor(t).window_like);
    if window_like {
        detach_window_content(doc, root);
    }
}

/// Detach a window root's constructed content so the editor can display it
/// independently of the owning window; a throwaway placeholder takes its
/// place in the window.
fn detach_window_content(doc: &mut FxomDocument, root: FxomId) {
    let registry = Arc::clone(&doc.registry);
    let Some(runtime) = doc.nodes[root.index()].runtime else {
        return;
    };
    let Some(type_id) = doc.nodes[root.index()].as_instance().and_then(|i| i.type_id) else {
        return;
    };
    let Some(slot) = registry.descriptor(type_id).default_property.clone() else {
        return;
    };
    let Some(Value::Object(content)) = doc.runtime.value(runtime, &slot).cloned() else {
        return;
    };
    doc.display_node = Some(content);
    match registry.resolve_qualified(fxf_registry::toolkit::PLACEHOLDER_TYPE) {
        Some(placeholder) => {
            let stand_in = registry.construct(placeholder, &mut doc.runtime);
            doc.runtime.set_value(runtime, &slot, Value::Object(stand_in));
        }
        None => {
            doc.runtime.remove_value(runtime, &slot);
        }
    }
}

fn build_object(doc: &mut FxomDocument, state: &mut LoaderState, element: XmlId) -> LoadResult<FxomId> {
    let name = element_name(doc, element)?;
    if let Some(kind) = IntrinsicKind::from_tag(&name) {
        return build_intrinsic(doc, state, element, kind);
    }

    let declared_name = if name == "fx:root" {
        match attribute(doc, element, "type") {
            Some(declared) => declared,
            None => {
                return Err(LoadAbort::Fatal(FxomError::Load {
                    message: "fx:root requires a type attribute".to_string(),
                    source: None,
                }));
            }
        }
    } else {
        name
    };

    let Some(type_id) = doc.registry.resolve(&declared_name, &state.imports) else {
        return Err(LoadAbort::Fatal(FxomError::UnresolvableType(declared_name)));
    };

    if doc.registry.descriptor(type_id).collection_like {
        build_collection(doc, state, element, declared_name, type_id)
    } else {
        build_instance(doc, state, element, declared_name, type_id)
    }
}

fn build_instance(
    doc: &mut FxomDocument,
    state: &mut LoaderState,
    element: XmlId,
    declared_name: String,
    type_id: TypeId,
) -> LoadResult<FxomId> {
    let registry = Arc::clone(&doc.registry);
    let runtime = registry.construct(type_id, &mut doc.runtime);

    // transient frame: collected properties and unnamed children
    let mut properties: IndexMap<PropertyName, PropId> = IndexMap::new();
    let mut default_objects: Vec<FxomId> = Vec::new();
    let mut default_text: Option<String> = None;

    for (attr_name, attr_value) in attributes(doc, element) {
        if attr_name.starts_with("xmlns") {
            continue;
        }
        if RESERVED_ATTRIBUTES.contains(&attr_name.as_str()) {
            if attr_name == "fx:value" {
                apply_runtime_text(doc, runtime, type_id, &PropertyName::new("value"), &attr_value);
            }
            continue;
        }
        if attr_name.starts_with("fx:") {
            tracing::warn!(attribute = %attr_name, "unrecognized reserved attribute");
            continue;
        }
        let prop_name = PropertyName::parse(&attr_name);
        apply_runtime_text(doc, runtime, type_id, &prop_name, &attr_value);
        let prop = alloc_text_property(doc, state, prop_name.clone(), attr_value, PropertyStore::Attribute);
        properties.insert(prop_name, prop);
    }

    for child in doc.markup.tree().children(element).to_vec() {
        match child_kind(doc, child) {
            ChildKind::SignificantText(text) => {
                default_text = Some(match default_text {
                    Some(existing) => format!("{existing}{text}"),
                    None => text,
                });
            }
            ChildKind::Skip => {}
            ChildKind::PropertyElement(tag) => {
                let prop_name = PropertyName::parse(&tag);
                let prop = build_property_element(doc, state, runtime, type_id, child, prop_name.clone())?;
                properties.insert(prop_name, prop);
            }
            ChildKind::ObjectElement => {
                let object = build_object(doc, state, child)?;
                default_objects.push(object);
            }
        }
    }

    if !default_objects.is_empty() {
        let Some(default) = registry.descriptor(type_id).default_property.clone() else {
            return Err(LoadAbort::Fatal(FxomError::Load {
                message: format!("{declared_name} cannot hold child objects"),
                source: None,
            }));
        };
        let prop_name = PropertyName::new(default);
        apply_runtime_objects(doc, runtime, type_id, &prop_name, &default_objects);
        let prop = doc.alloc_property(FxomProperty {
            name: prop_name.clone(),
            parent: None,
            store: PropertyStore::Implicit,
            value: PropertyValue::Objects(default_objects),
            residence_class: None,
        });
        properties.insert(prop_name, prop);
    } else if let Some(text) = default_text {
        let text = text.trim().to_string();
        if !text.is_empty() {
            if let Some(default) = registry.descriptor(type_id).default_property.clone() {
                let prop_name = PropertyName::new(default);
                apply_runtime_text(doc, runtime, type_id, &prop_name, &text);
                let prop = alloc_text_property(doc, state, prop_name.clone(), text, PropertyStore::Implicit);
                properties.insert(prop_name, prop);
            } else {
                tracing::warn!(%declared_name, "text content on a type with no default property");
            }
        }
    }

    let node = doc.alloc_node(FxomNode {
        element,
        runtime: Some(runtime),
        parent: None,
        data: FxomData::Instance(InstanceData {
            declared_name,
            type_id: Some(type_id),
            properties: properties.clone(),
        }),
    });
    link_properties(doc, node, properties.values().copied());
    Ok(node)
}

fn build_collection(
    doc: &mut FxomDocument,
    state: &mut LoaderState,
    element: XmlId,
    declared_name: String,
    type_id: TypeId,
) -> LoadResult<FxomId> {
    let registry = Arc::clone(&doc.registry);
    let runtime = registry.construct(type_id, &mut doc.runtime);
    let mut items = Vec::new();

    for child in doc.markup.tree().children(element).to_vec() {
        match child_kind(doc, child) {
            ChildKind::ObjectElement | ChildKind::PropertyElement(_) => {
                let item = build_object(doc, state, child)?;
                items.push(item);
            }
            ChildKind::SignificantText(text) => {
                tracing::warn!(%declared_name, %text, "text content in a collection ignored");
            }
            ChildKind::Skip => {}
        }
    }

    if let Some(slot) = registry.descriptor(type_id).default_property.clone() {
        let prop_name = PropertyName::new(slot);
        apply_runtime_objects(doc, runtime, type_id, &prop_name, &items);
    }

    let node = doc.alloc_node(FxomNode {
        element,
        runtime: Some(runtime),
        parent: None,
        data: FxomData::Collection(CollectionData {
            declared_name,
            type_id: Some(type_id),
            items: items.clone(),
        }),
    });
    for item in items {
        doc.nodes[item.index()].parent = Some(FxomParent::Collection(node));
    }
    Ok(node)
}

fn build_intrinsic(
    doc: &mut FxomDocument,
    state: &mut LoaderState,
    element: XmlId,
    kind: IntrinsicKind,
) -> LoadResult<FxomId> {
    let mut properties: IndexMap<PropertyName, PropId> = IndexMap::new();

    for (attr_name, attr_value) in attributes(doc, element) {
        if RESERVED_ATTRIBUTES.contains(&attr_name.as_str()) || attr_name.starts_with("xmlns") {
            continue;
        }
        if kind == IntrinsicKind::Include
            && attr_name == "charset"
            && !RECOGNIZED_CHARSETS.contains(&attr_value.to_ascii_lowercase().as_str())
        {
            return Err(LoadAbort::Known(KnownError::UnresolvableCharset {
                charset: attr_value,
            }));
        }
        let prop_name = PropertyName::parse(&attr_name);
        let prop = alloc_text_property(doc, state, prop_name.clone(), attr_value, PropertyStore::Attribute);
        properties.insert(prop_name, prop);
    }

    let runtime = if kind == IntrinsicKind::Include {
        let source = properties
            .get(&PropertyName::new("source"))
            .and_then(|&p| doc.property(p))
            .and_then(|p| p.text().map(str::to_string));
        source.and_then(|source| resolve_include(doc, state, &source))
    } else {
        // references and copies resolve after the whole tree is built
        None
    };

    let node = doc.alloc_node(FxomNode {
        element,
        runtime,
        parent: None,
        data: FxomData::Intrinsic(IntrinsicData {
            kind,
            properties: properties.clone(),
        }),
    });
    link_properties(doc, node, properties.values().copied());
    Ok(node)
}

/// Expand an include target into runtime objects only; the including
/// document's object model keeps the intrinsic node. A missing or broken
/// target leaves the intrinsic unresolved rather than failing the load.
fn resolve_include(doc: &mut FxomDocument, state: &mut LoaderState, source: &str) -> Option<ObjId> {
    let base = doc.location.as_ref()?;
    let path = base.parent().unwrap_or(base).join(source);
    let canonical = path.canonicalize().unwrap_or(path.clone());
    if state.include_stack.contains(&canonical) {
        tracing::warn!(path = %canonical.display(), "include cycle, leaving unresolved");
        return None;
    }
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(path = %path.display(), %e, "include target unavailable");
            return None;
        }
    };
    let included = fxf_markup::parse(&text).ok()?;
    let root = included.root()?;
    let imports = included
        .header_instructions("import")
        .into_iter()
        .map(|(_, directive)| Import::parse(&directive))
        .collect::<Vec<_>>();

    state.include_stack.push(canonical);
    let built = build_runtime_only(doc, state, &included, &imports, root);
    state.include_stack.pop();
    built
}

/// Runtime-only mirror of `build_object` for included fragments: no object
/// model nodes are created for the included content.
fn build_runtime_only(
    doc: &mut FxomDocument,
    state: &mut LoaderState,
    included: &XmlDocument,
    imports: &[Import],
    element: XmlId,
) -> Option<ObjId> {
    let registry = Arc::clone(&doc.registry);
    let element_data = included.tree().element(element)?.clone();
    let name = element_data.name.clone();

    if IntrinsicKind::from_tag(&name).is_some() {
        // nested intrinsics inside an include stay unresolved
        return None;
    }
    let declared_name = if name == "fx:root" {
        element_data.attribute("type")?.to_string()
    } else {
        name
    };
    let type_id = registry.resolve(&declared_name, imports)?;
    let runtime = registry.construct(type_id, &mut doc.runtime);

    for (attr_name, attr_value) in element_data.attributes() {
        if attr_name.starts_with("xmlns")
            || attr_name.starts_with("fx:")
            || attr_name.contains('.')
        {
            continue;
        }
        apply_runtime_text(doc, runtime, type_id, &PropertyName::new(attr_name), attr_value);
    }

    let mut unnamed = Vec::new();
    for &child in element_data.children() {
        let Some(child_element) = included.tree().element(child) else {
            continue;
        };
        let tag = child_element.name.clone();
        if is_property_tag(&tag) {
            let prop_name = PropertyName::parse(&tag);
            let mut objects = Vec::new();
            for &value in included.tree().element(child)?.children() {
                if included.tree().get(value).is_some_and(|n| n.is_element()) {
                    if let Some(obj) = build_runtime_only(doc, state, included, imports, value) {
                        objects.push(obj);
                    }
                }
            }
            apply_runtime_handles(doc, runtime, type_id, &prop_name, &objects);
        } else if let Some(obj) = build_runtime_only(doc, state, included, imports, child) {
            unnamed.push(obj);
        }
    }
    if !unnamed.is_empty() {
        if let Some(default) = registry.descriptor(type_id).default_property.clone() {
            apply_runtime_handles(doc, runtime, type_id, &PropertyName::new(default), &unnamed);
        }
    }
    Some(runtime)
}

/// Second pass: `fx:reference` aliases the runtime object of its source id,
/// `fx:copy` duplicates it. Unresolvable sources stay unresolved.
fn resolve_intrinsic_references(doc: &mut FxomDocument) {
    let all: Vec<FxomId> = (0..doc.nodes.len() as u32).map(FxomId).collect();
    for id in all {
        let Some(intrinsic) = doc.nodes[id.index()].as_intrinsic() else {
            continue;
        };
        let kind = intrinsic.kind;
        if kind == IntrinsicKind::Include {
            continue;
        }
        let source = intrinsic
            .properties
            .get(&PropertyName::new("source"))
            .and_then(|&p| doc.property(p))
            .and_then(|p| p.text().map(str::to_string));
        let Some(source) = source else { continue };
        let Some(target) = doc
            .collect_ids()
            .into_iter()
            .find(|(fx_id, _)| *fx_id == source)
            .map(|(_, target)| target)
        else {
            tracing::debug!(%source, "intrinsic source id not found");
            continue;
        };
        let target_runtime = doc.nodes[target.index()].runtime;
        doc.nodes[id.index()].runtime = match (kind, target_runtime) {
            (IntrinsicKind::Reference, runtime) => runtime,
            (IntrinsicKind::Copy, Some(runtime)) => Some(doc.runtime.deep_copy(runtime)),
            (IntrinsicKind::Copy, None) => None,
            (IntrinsicKind::Include, _) => unreachable!("includes resolved in first pass"),
        };
    }
}

fn build_property_element(
    doc: &mut FxomDocument,
    state: &mut LoaderState,
    runtime: ObjId,
    type_id: TypeId,
    element: XmlId,
    prop_name: PropertyName,
) -> LoadResult<PropId> {
    let mut objects = Vec::new();
    let mut text: Option<String> = None;

    for child in doc.markup.tree().children(element).to_vec() {
        match child_kind(doc, child) {
            ChildKind::SignificantText(t) => {
                text = Some(match text {
                    Some(existing) => format!("{existing}{t}"),
                    None => t,
                });
            }
            ChildKind::Skip => {}
            ChildKind::PropertyElement(tag) => {
                tracing::warn!(%tag, "property element nested in property element ignored");
            }
            ChildKind::ObjectElement => {
                let object = build_object(doc, state, child)?;
                objects.push(object);
            }
        }
    }

    let prop = if objects.is_empty() {
        let value = text.map(|t| t.trim().to_string()).unwrap_or_default();
        apply_runtime_text(doc, runtime, type_id, &prop_name, &value);
        alloc_text_property(doc, state, prop_name, value, PropertyStore::Element(element))
    } else {
        apply_runtime_objects(doc, runtime, type_id, &prop_name, &objects);
        let residence_class = resolve_residence(doc, state, &prop_name);
        doc.alloc_property(FxomProperty {
            name: prop_name,
            parent: None,
            store: PropertyStore::Element(element),
            value: PropertyValue::Objects(objects),
            residence_class,
        })
    };
    Ok(prop)
}

// ------------------------------------------------------------- helpers

enum ChildKind {
    /// Non-whitespace text run
    SignificantText(String),
    /// Whitespace, comments, processing instructions
    Skip,
    /// Lowercase-initial tag: a property of the enclosing instance
    PropertyElement(String),
    /// Instance, collection, or intrinsic declaration
    ObjectElement,
}

fn child_kind(doc: &FxomDocument, child: XmlId) -> ChildKind {
    match doc.markup.tree().get(child).map(|n| n.data()) {
        Some(XmlData::Text(text)) if !text.trim().is_empty() => {
            ChildKind::SignificantText(text.clone())
        }
        Some(XmlData::Element(element)) => {
            let name = element.name.clone();
            if IntrinsicKind::from_tag(&name).is_some() || name == "fx:root" {
                ChildKind::ObjectElement
            } else if is_property_tag(&name) {
                ChildKind::PropertyElement(name)
            } else {
                ChildKind::ObjectElement
            }
        }
        _ => ChildKind::Skip,
    }
}

/// Property tags start lowercase in their final segment; instance tags are
/// uppercase-initial (`Button`, `forge.controls.Button`).
fn is_property_tag(name: &str) -> bool {
    let last = name.rsplit('.').next().unwrap_or(name);
    last.chars().next().is_some_and(char::is_lowercase)
}

fn element_name(doc: &FxomDocument, element: XmlId) -> LoadResult<String> {
    doc.markup
        .tree()
        .element(element)
        .map(|e| e.name.clone())
        .ok_or_else(|| {
            LoadAbort::Fatal(FxomError::Load {
                message: "dangling markup element".to_string(),
                source: None,
            })
        })
}

fn attribute(doc: &FxomDocument, element: XmlId, name: &str) -> Option<String> {
    doc.markup
        .tree()
        .element(element)
        .and_then(|e| e.attribute(name))
        .map(str::to_string)
}

fn attributes(doc: &FxomDocument, element: XmlId) -> Vec<(String, String)> {
    doc.markup
        .tree()
        .element(element)
        .map(|e| {
            e.attributes()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn alloc_text_property(
    doc: &mut FxomDocument,
    state: &LoaderState,
    name: PropertyName,
    value: String,
    store: PropertyStore,
) -> PropId {
    let residence_class = resolve_residence(doc, state, &name);
    doc.alloc_property(FxomProperty {
        name,
        parent: None,
        store,
        value: PropertyValue::Text(value),
        residence_class,
    })
}

fn resolve_residence(doc: &FxomDocument, state: &LoaderState, name: &PropertyName) -> Option<String> {
    let residence = name.residence.as_deref()?;
    match doc.registry.resolve(residence, &state.imports) {
        Some(type_id) => Some(doc.registry.descriptor(type_id).qualified_name.clone()),
        None => {
            tracing::warn!(%residence, "unresolvable residence class");
            None
        }
    }
}

fn link_properties(doc: &mut FxomDocument, owner: FxomId, props: impl Iterator<Item = PropId>) {
    for prop in props {
        doc.properties[prop.index()].parent = Some(owner);
        let objects = doc.properties[prop.index()].objects().to_vec();
        for object in objects {
            doc.nodes[object.index()].parent = Some(FxomParent::Property(prop));
        }
    }
}

/// Apply a text value to the runtime object. Binding (`$`) and handler
/// (`#`) markers are left unapplied on purpose: escaping them is not
/// possible for every property type, so the literal stays in the document
/// and the runtime keeps its default. `%key` values substitute from the
/// resource map.
fn apply_runtime_text(
    doc: &mut FxomDocument,
    runtime: ObjId,
    type_id: TypeId,
    name: &PropertyName,
    raw: &str,
) {
    if raw.starts_with('$') || raw.starts_with('#') {
        return;
    }
    let applied = match raw.strip_prefix('%') {
        Some(key) => match doc.resources.as_ref().and_then(|r| r.get(key)) {
            Some(resolved) => resolved.clone(),
            None => {
                tracing::warn!(%key, "resource key not found, keeping literal");
                raw.to_string()
            }
        },
        None => raw.to_string(),
    };

    if let Some(residence) = &name.residence {
        // attached property: recorded on this object under its qualified key
        doc.runtime
            .set_value(runtime, &format!("{residence}.{}", name.name), Value::Text(applied));
        return;
    }
    let descriptor = doc.registry.descriptor(type_id);
    match descriptor.properties.get(&name.name) {
        Some(spec) if spec.kind == PropertyKind::Value => {
            doc.runtime.set_value(runtime, &name.name, Value::Text(applied));
        }
        Some(_) => {
            tracing::warn!(property = %name, "text value on a non-text property ignored");
        }
        None => {
            tracing::warn!(
                type_name = %descriptor.qualified_name,
                property = %name,
                "unknown property left unapplied"
            );
        }
    }
}

fn apply_runtime_objects(
    doc: &mut FxomDocument,
    runtime: ObjId,
    type_id: TypeId,
    name: &PropertyName,
    objects: &[FxomId],
) {
    let handles: Vec<ObjId> = objects
        .iter()
        .filter_map(|&o| doc.nodes[o.index()].runtime)
        .collect();
    apply_runtime_handles(doc, runtime, type_id, name, &handles);
}

fn apply_runtime_handles(
    doc: &mut FxomDocument,
    runtime: ObjId,
    type_id: TypeId,
    name: &PropertyName,
    handles: &[ObjId],
) {
    if name.residence.is_some() {
        tracing::warn!(property = %name, "object values on an attached property ignored");
        return;
    }
    let descriptor = doc.registry.descriptor(type_id);
    match descriptor.properties.get(&name.name) {
        Some(spec) if spec.kind == PropertyKind::Handle => {
            if let Some(&first) = handles.first() {
                doc.runtime.set_value(runtime, &name.name, Value::Object(first));
            }
        }
        Some(spec) if spec.kind == PropertyKind::List => {
            for &handle in handles {
                doc.runtime.append_to_list(runtime, &name.name, handle);
            }
        }
        Some(_) => {
            tracing::warn!(property = %name, "object values on a text property ignored");
        }
        None => {
            tracing::warn!(
                type_name = %descriptor.qualified_name,
                property = %name,
                "unknown object property left unapplied"
            );
        }
    }
}
