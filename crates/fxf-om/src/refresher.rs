//! FXOM refresher
//!
//! Regenerates markup from the current object model, re-loads it into a
//! throwaway document, and copies the freshly constructed runtime objects
//! onto the existing node identities. Consumers holding `FxomId`s keep
//! valid handles across the refresh; only the wrapped runtime objects
//! change.

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use fxf_registry::{PropertyKind, Value};

use crate::document::FxomDocument;
use crate::edit::sync_text_property;
use crate::object::{FxomData, IntrinsicKind};
use crate::property::{PropertyName, PropertyValue};
use crate::saver::SaveOptions;
use crate::{FxomError, FxomId, PropId};

pub(crate) fn refresh(doc: &mut FxomDocument) {
    let text = crate::saver::save(doc, &SaveOptions::default());

    let reloaded = FxomDocument::open_with_resources(
        &text,
        Arc::clone(&doc.registry),
        doc.resources.clone(),
        doc.location.clone(),
    );
    let mut fresh = match reloaded {
        Ok(fresh) => fresh,
        // The text was generated from a well-formed model; failing to parse
        // it back is an internal invariant violation, not a user error.
        Err(e) => dump_and_abort(&text, &e),
    };

    if fresh.root.is_none() && fresh.runtime_root.is_none() {
        if doc.root.is_some() {
            // Historical quirk: a charset defect on the first include can
            // make the whole reload come back empty. Strip the hoisted
            // charset property and skip the structural copy for this pass.
            strip_first_include_charset(doc);
        }
        return;
    }

    match (doc.root, fresh.root) {
        (Some(current), Some(new)) => reconcile(doc, current, &fresh, new),
        (None, None) => {}
        (current, new) => panic!(
            "refresh root presence diverged (current: {}, reloaded: {})",
            current.is_some(),
            new.is_some()
        ),
    }

    doc.runtime = std::mem::take(&mut fresh.runtime);
    doc.runtime_root = fresh.runtime_root;
    doc.display_node = fresh.display_node;

    // The rendering toolkit applies the implicit root style class once at
    // scene attachment; re-applying here keeps rebuilt roots styled.
    if let Some(root) = doc.runtime_root {
        doc.runtime.ensure_style_class(root, "root");
    }

    sync_layout_properties(doc);
    tracing::debug!(revision = doc.scene_graph_revision(), "refreshed runtime graph");
}

/// Structural lockstep walk. Shape equality is asserted, not assumed: a
/// mismatch under normal operation is a programming error. The one
/// tolerated asymmetry is an intrinsic paired with an instance materialized
/// from it (include resolution can legitimately change shape between
/// passes).
fn reconcile(doc: &mut FxomDocument, current: FxomId, fresh: &FxomDocument, new: FxomId) {
    doc.nodes[current.index()].runtime = fresh.nodes[new.index()].runtime;

    enum Shape {
        Instance(Vec<(String, PropId)>, String),
        Collection(Vec<FxomId>),
        Intrinsic,
    }

    fn shape_of(doc: &FxomDocument, id: FxomId) -> Shape {
        match &doc.nodes[id.index()].data {
            FxomData::Instance(instance) => Shape::Instance(
                instance
                    .properties
                    .iter()
                    .map(|(name, &prop)| (name.to_string(), prop))
                    .collect(),
                instance.declared_name.clone(),
            ),
            FxomData::Collection(collection) => Shape::Collection(collection.items.clone()),
            FxomData::Intrinsic(_) => Shape::Intrinsic,
        }
    }

    match (shape_of(doc, current), shape_of(fresh, new)) {
        (Shape::Instance(current_props, current_class), Shape::Instance(new_props, new_class)) => {
            assert_eq!(
                current_class, new_class,
                "reconcile paired instances of different declared classes"
            );
            let current_names: BTreeSet<&String> =
                current_props.iter().map(|(name, _)| name).collect();
            let new_names: BTreeSet<&String> = new_props.iter().map(|(name, _)| name).collect();
            assert_eq!(
                current_names, new_names,
                "reconcile paired instances with different property sets"
            );
            for (name, current_prop) in &current_props {
                let (_, new_prop) = new_props
                    .iter()
                    .find(|(new_name, _)| new_name == name)
                    .expect("property sets asserted equal");
                let current_values = doc.properties[current_prop.index()].objects().to_vec();
                let new_values = fresh.properties[new_prop.index()].objects().to_vec();
                assert_eq!(
                    current_values.len(),
                    new_values.len(),
                    "reconcile property {name} changed value count"
                );
                for (&cv, &nv) in current_values.iter().zip(new_values.iter()) {
                    reconcile(doc, cv, fresh, nv);
                }
            }
        }
        (Shape::Collection(current_items), Shape::Collection(new_items)) => {
            assert_eq!(
                current_items.len(),
                new_items.len(),
                "reconcile paired collections of different sizes"
            );
            for (&ci, &ni) in current_items.iter().zip(new_items.iter()) {
                reconcile(doc, ci, fresh, ni);
            }
        }
        (Shape::Intrinsic, Shape::Intrinsic) => {}
        // include materialization: shape may differ, runtime already copied
        (Shape::Intrinsic, Shape::Instance(..)) | (Shape::Instance(..), Shape::Intrinsic) => {}
        _ => panic!("reconcile paired nodes of incompatible kinds"),
    }
}

/// Remove the hoisted `charset` property from the first intrinsic child of
/// the root. Narrow recovery for one known defect, not a general error
/// path.
fn strip_first_include_charset(doc: &mut FxomDocument) {
    let Some(root) = doc.root else { return };
    let first_intrinsic = doc
        .child_objects(root)
        .into_iter()
        .find(|&id| matches!(doc.nodes[id.index()].data, FxomData::Intrinsic(_)));
    let Some(intrinsic) = first_intrinsic else {
        // the defect may sit at the root itself
        if matches!(doc.nodes[root.index()].data, FxomData::Intrinsic(_)) {
            remove_intrinsic_charset(doc, root);
        }
        return;
    };
    remove_intrinsic_charset(doc, intrinsic);
}

fn remove_intrinsic_charset(doc: &mut FxomDocument, id: FxomId) {
    let charset = PropertyName::new("charset");
    let FxomData::Intrinsic(intrinsic) = &mut doc.nodes[id.index()].data else {
        return;
    };
    if intrinsic.kind != IntrinsicKind::Include {
        return;
    }
    let Some(prop) = intrinsic.properties.shift_remove(&charset) else {
        return;
    };
    tracing::warn!("stripping charset from first include after failed reload");
    doc.properties[prop.index()].parent = None;
    let element = doc.nodes[id.index()].element;
    if let Some(e) = doc.markup.tree_mut().element_mut(element) {
        e.remove_attribute("charset");
    }
}

/// One-way sync of layout-determined runtime state back into the document
/// (divider positions and friends can only be known after layout).
pub(crate) fn sync_layout_properties(doc: &mut FxomDocument) {
    let registry = Arc::clone(&doc.registry);
    let all: Vec<FxomId> = (0..doc.nodes.len() as u32).map(FxomId).collect();
    for id in all {
        let Some(instance) = doc.nodes[id.index()].as_instance() else {
            continue;
        };
        let Some(type_id) = instance.type_id else { continue };
        let Some(runtime) = doc.nodes[id.index()].runtime else {
            continue;
        };
        let synced: Vec<String> = registry
            .descriptor(type_id)
            .properties
            .iter()
            .filter(|(_, spec)| spec.layout_synced && spec.kind == PropertyKind::Value)
            .map(|(name, _)| name.clone())
            .collect();
        for name in synced {
            let Some(Value::Text(runtime_value)) = doc.runtime.value(runtime, &name).cloned()
            else {
                continue;
            };
            let prop_name = PropertyName::new(name.clone());
            let prop = doc.nodes[id.index()]
                .as_instance()
                .and_then(|i| i.properties.get(&prop_name))
                .copied();
            let Some(prop) = prop else { continue };
            let differs = !matches!(
                &doc.properties[prop.index()].value,
                PropertyValue::Text(text) if *text == runtime_value
            );
            if differs {
                let _ = sync_text_property(doc, prop, runtime_value);
            }
        }
    }
}

/// Write the just-rendered markup to a temp file and abort: this path is an
/// internal invariant violation, not a recoverable condition.
fn dump_and_abort(text: &str, error: &FxomError) -> ! {
    let dump = tempfile::Builder::new()
        .prefix("fxforge-refresh-")
        .suffix(".fxml")
        .tempfile()
        .and_then(|mut file| {
            file.write_all(text.as_bytes())?;
            let (_, path) = file.keep().map_err(|e| e.error)?;
            Ok(path)
        });
    match dump {
        Ok(path) => panic!(
            "refresh could not reload its own output ({error}); markup dumped to {}",
            path.display()
        ),
        Err(io) => panic!(
            "refresh could not reload its own output ({error}); dump also failed: {io}"
        ),
    }
}
