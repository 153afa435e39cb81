//! fx:id bookkeeping
//!
//! Ids are unique within a document at any instant. When a subtree crosses
//! document boundaries, colliding ids are renamed throughout the moved
//! subtree: the declaration itself, `$id` binding expressions, and intrinsic
//! `source` attributes naming the id.

use std::collections::BTreeSet;

use crate::document::FxomDocument;
use crate::edit::sync_text_property;
use crate::object::FxomData;
use crate::property::PropertyValue;
use crate::{FxomId, FxomResult};

/// Ids declared inside a (possibly detached) subtree, in document order
pub(crate) fn ids_in_subtree(doc: &FxomDocument, from: FxomId) -> Vec<(String, FxomId)> {
    doc.descendants(from)
        .into_iter()
        .filter_map(|id| doc.fx_id(id).map(|fx_id| (fx_id.to_string(), id)))
        .collect()
}

/// First id derived from `base` that is not in `used`
pub(crate) fn next_free_id_among(used: &BTreeSet<String>, base: &str) -> String {
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

/// Rename ids in a freshly adopted, still detached subtree so that nothing
/// collides with the ids already present in the document. Non-colliding ids
/// are untouched.
pub(crate) fn rename_colliding_ids(doc: &mut FxomDocument, adopted: FxomId) -> FxomResult<()> {
    let existing: BTreeSet<String> = doc.collect_ids().into_iter().map(|(id, _)| id).collect();
    let subtree_ids = ids_in_subtree(doc, adopted);
    let mut used: BTreeSet<String> = existing.clone();
    used.extend(subtree_ids.iter().map(|(id, _)| id.clone()));

    for (old, _) in subtree_ids {
        if !existing.contains(&old) {
            continue;
        }
        let fresh = next_free_id_among(&used, &old);
        used.insert(fresh.clone());
        tracing::debug!(%old, %fresh, "renaming colliding fx:id in adopted subtree");
        rename_in_subtree(doc, adopted, &old, &fresh)?;
    }
    Ok(())
}

/// Rename one id throughout a subtree: declaration, `$id` expressions, and
/// intrinsic `source` references
pub(crate) fn rename_in_subtree(
    doc: &mut FxomDocument,
    from: FxomId,
    old: &str,
    new: &str,
) -> FxomResult<()> {
    let binding = format!("${old}");
    for id in doc.descendants(from) {
        if doc.fx_id(id) == Some(old) {
            let element = doc.node(id).map(|n| n.element());
            if let Some(element) = element {
                if let Some(e) = doc.markup.tree_mut().element_mut(element) {
                    e.set_attribute("fx:id", new);
                }
            }
        }
        let Some(node) = doc.node(id) else { continue };
        let (is_intrinsic, properties) = match &node.data {
            FxomData::Instance(instance) => (false, instance.properties.clone()),
            FxomData::Intrinsic(intrinsic) => (true, intrinsic.properties.clone()),
            FxomData::Collection(_) => continue,
        };
        for (name, prop) in properties {
            let text = match doc.property(prop).map(|p| &p.value) {
                Some(PropertyValue::Text(text)) => text.clone(),
                _ => continue,
            };
            if text == binding {
                sync_text_property(doc, prop, format!("${new}"))?;
            } else if is_intrinsic && name.name == "source" && text == old {
                sync_text_property(doc, prop, new.to_string())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_free_id_among() {
        let used: BTreeSet<String> =
            ["button".to_string(), "button1".to_string()].into_iter().collect();
        assert_eq!(next_free_id_among(&used, "button"), "button2");
        assert_eq!(next_free_id_among(&used, "label"), "label");
    }
}
