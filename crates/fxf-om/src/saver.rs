//! FXOM saver
//!
//! Serializes the object model back to markup text. Before emission the
//! root's namespace attributes are brought current and the header's import
//! directives are recomputed from the declared and residence classes
//! actually reachable from the root.

use std::collections::BTreeSet;

use crate::document::FxomDocument;
use crate::{FX_NAMESPACE, UI_NAMESPACE};

/// Save-time choices
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Fold imports to package wildcards instead of single types
    pub wildcard_imports: bool,
    /// Re-indent the markup before emission
    pub normalize_indentation: bool,
}

/// Serialize the document. Saving an unmodified document twice yields
/// identical text; a rootless document saves to the empty string.
pub(crate) fn save(doc: &mut FxomDocument, options: &SaveOptions) -> String {
    let Some(root) = doc.root else {
        return String::new();
    };

    let root_element = doc.nodes[root.index()].element;
    if let Some(element) = doc.markup.tree_mut().element_mut(root_element) {
        element.set_attribute("xmlns", UI_NAMESPACE);
        element.set_attribute("xmlns:fx", FX_NAMESPACE);
    }

    update_imports(doc, options.wildcard_imports);

    if options.normalize_indentation {
        fxf_markup::normalize_indentation(&mut doc.markup);
    }
    fxf_markup::serialize(&doc.markup)
}

/// Replace the header's import directives with the freshly computed set, at
/// the position of the first pre-existing import. Other header nodes
/// (comments, the XML declaration, unrelated instructions) stay untouched.
fn update_imports(doc: &mut FxomDocument, wildcard: bool) {
    let classes = doc.collect_declared_classes();
    let directives: BTreeSet<String> = classes
        .into_iter()
        .map(|class| {
            if wildcard {
                match class.rfind('.') {
                    Some(dot) => format!("{}.*", &class[..dot]),
                    None => class,
                }
            } else {
                class
            }
        })
        .collect();

    let existing: Vec<_> = doc.markup.header_instructions("import");
    let splice_at = existing
        .first()
        .and_then(|(first, _)| doc.markup.header().iter().position(|&id| id == *first));
    for (id, _) in &existing {
        doc.markup.remove_header_node(*id);
    }

    let insert_at = splice_at.unwrap_or(doc.markup.header().len());
    for (offset, directive) in directives.iter().enumerate() {
        let pi = doc.markup.tree_mut().create_pi("import", directive.clone());
        doc.markup.insert_header_node(insert_at + offset, pi);
    }
    tracing::debug!(imports = directives.len(), "recomputed import directives");
}
