//! Edge case tests for fxf-om
//!
//! Failure taxonomy: malformed markup, unresolvable types, the known-error
//! charset path, id collisions and invalid structural operations.

use std::error::Error as _;
use std::sync::Arc;

use fxf_om::{FxomDocument, FxomError, PropertyName, SaveOptions};
use fxf_registry::toolkit;

fn open(text: &str) -> fxf_om::FxomResult<FxomDocument> {
    FxomDocument::open(text, Arc::new(toolkit::standard_registry()))
}

#[test]
fn test_malformed_markup_fails_with_cause() {
    let err = open("<VBox><children></VBox>").unwrap_err();
    match &err {
        FxomError::Load { source, .. } => {
            assert!(source.is_some(), "markup cause preserved");
        }
        other => panic!("expected load error, got {other}"),
    }
    // the cause chain is reachable through the standard error interface
    assert!(err.source().is_some());
}

#[test]
fn test_unterminated_document_fails() {
    assert!(open("<VBox>").is_err());
}

#[test]
fn test_unresolvable_type_fails_with_name() {
    let err = open("<?import forge.layout.VBox?>\n<VBox><children><Spinner/></children></VBox>\n")
        .unwrap_err();
    match err {
        FxomError::UnresolvableType(name) => assert_eq!(name, "Spinner"),
        other => panic!("expected unresolvable type, got {other}"),
    }
}

#[test]
fn test_simple_name_without_import_fails() {
    // Button is registered but not imported here
    let err = open("<Button/>").unwrap_err();
    assert!(matches!(err, FxomError::UnresolvableType(name) if name == "Button"));
}

#[test]
fn test_unresolvable_charset_reports_known_error() {
    let text = "<?import forge.layout.VBox?>\n\
        <VBox>\n\
           <children>\n\
              <fx:include source=\"part.fxml\" charset=\"EBCDIC-NOPE\"/>\n\
           </children>\n\
        </VBox>\n";
    let mut reported = Vec::new();
    let doc = FxomDocument::open_reporting(
        text,
        Arc::new(toolkit::standard_registry()),
        None,
        None,
        &mut |known| reported.push(known.to_string()),
    )
    .expect("known defect is not a load failure");

    assert!(doc.root().is_none(), "document left rootless");
    assert_eq!(reported.len(), 1);
    assert!(reported[0].contains("EBCDIC-NOPE"));
}

#[test]
fn test_recognized_charset_is_not_reported() {
    let text = "<?import forge.layout.VBox?>\n\
        <VBox>\n\
           <children>\n\
              <fx:include source=\"part.fxml\" charset=\"UTF-8\"/>\n\
           </children>\n\
        </VBox>\n";
    let doc = FxomDocument::open_reporting(
        text,
        Arc::new(toolkit::standard_registry()),
        None,
        None,
        &mut |known| panic!("unexpected known error: {known}"),
    )
    .unwrap();
    assert!(doc.root().is_some());
}

#[test]
fn test_duplicate_fx_id_rejected() {
    let mut doc = open(
        "<?import forge.controls.Button?>\n\
         <?import forge.layout.VBox?>\n\
         <VBox>\n\
            <children>\n\
               <Button fx:id=\"a\"/>\n\
               <Button fx:id=\"b\"/>\n\
            </children>\n\
         </VBox>\n",
    )
    .unwrap();
    let second = doc.object_at_path(&[1]).unwrap();
    let err = doc.set_fx_id(second, Some("a")).unwrap_err();
    assert!(matches!(err, FxomError::DuplicateId(id) if id == "a"));
    // re-assigning an object its own id is fine
    doc.set_fx_id(second, Some("b")).unwrap();
}

#[test]
fn test_insert_into_text_property_rejected() {
    let mut doc = open(
        "<?import forge.controls.Button?>\n\
         <?import forge.layout.VBox?>\n\
         <VBox spacing=\"2\"><children><Button/></children></VBox>\n",
    )
    .unwrap();
    let root = doc.root().unwrap();
    let detached = doc.new_instance("forge.controls.Label").unwrap();
    let err = doc
        .insert_object(detached, root, PropertyName::new("spacing"), 0)
        .unwrap_err();
    assert!(matches!(err, FxomError::NotAnObjectProperty(_)));
}

#[test]
fn test_insert_attached_object_rejects_bad_index() {
    let mut doc = open("<?import forge.layout.VBox?>\n<VBox/>\n").unwrap();
    let root = doc.root().unwrap();
    let child = doc.new_instance("forge.controls.Button").unwrap();
    let err = doc
        .insert_object(child, root, PropertyName::new("children"), 3)
        .unwrap_err();
    assert!(matches!(err, FxomError::IndexOutOfBounds { .. }));
}

#[test]
fn test_attached_object_cannot_be_inserted_twice() {
    let mut doc = open("<?import forge.layout.VBox?>\n<VBox/>\n").unwrap();
    let root = doc.root().unwrap();
    let child = doc.new_instance("forge.controls.Button").unwrap();
    doc.edit(|d| {
        d.insert_object(child, root, PropertyName::new("children"), 0).unwrap();
        let err = d
            .insert_object(child, root, PropertyName::new("children"), 0)
            .unwrap_err();
        assert!(matches!(err, FxomError::StillAttached));
    });
}

#[test]
fn test_removing_last_value_drops_property_element() {
    let mut doc = open(
        "<?import forge.controls.Button?>\n\
         <?import forge.layout.VBox?>\n\
         <VBox><children><Button fx:id=\"only\"/></children></VBox>\n",
    )
    .unwrap();
    let button = doc.object_at_path(&[0]).unwrap();
    doc.edit(|d| d.remove_object(button).unwrap());

    let root = doc.root().unwrap();
    let instance = doc.node(root).unwrap().as_instance().unwrap();
    assert!(instance.properties.is_empty());
    let saved = doc.save(&SaveOptions::default());
    assert!(!saved.contains("<children>"));
    assert!(!saved.contains("Button"));
}

#[test]
fn test_removed_object_can_be_reattached_elsewhere() {
    let mut doc = open(
        "<?import forge.controls.Button?>\n\
         <?import forge.layout.VBox?>\n\
         <VBox>\n\
            <children>\n\
               <VBox fx:id=\"inner\"/>\n\
               <Button fx:id=\"moved\"/>\n\
            </children>\n\
         </VBox>\n",
    )
    .unwrap();
    let inner = doc.object_at_path(&[0]).unwrap();
    let moved = doc.object_at_path(&[1]).unwrap();
    doc.edit(|d| {
        d.remove_object(moved).unwrap();
        d.insert_object(moved, inner, PropertyName::new("children"), 0).unwrap();
    });
    assert_eq!(doc.object_at_path(&[0, 0]), Some(moved));
    assert_eq!(doc.collect_ids().len(), 2, "no ids duplicated by a move");
}

#[test]
fn test_binding_expressions_survive_untouched() {
    let text = "<?import forge.controls.Button?>\n\
        <Button onAction=\"#handlePress\" text=\"$other\"/>\n";
    let mut doc = open(text).unwrap();
    let root = doc.root().unwrap();
    let runtime = doc.node(root).unwrap().runtime().unwrap();
    // neither marker was applied to the runtime object
    assert!(doc.runtime_graph().value(runtime, "onAction").is_none());
    assert!(doc.runtime_graph().value(runtime, "text").is_none());
    // both literals stay in the saved document
    let saved = doc.save(&SaveOptions::default());
    assert!(saved.contains("onAction=\"#handlePress\""));
    assert!(saved.contains("text=\"$other\""));
}

#[test]
fn test_unknown_property_is_kept_in_document() {
    let text = "<?import forge.controls.Button?>\n<Button mystery=\"42\"/>\n";
    let mut doc = open(text).unwrap();
    let saved = doc.save(&SaveOptions::default());
    assert!(saved.contains("mystery=\"42\""));
}

#[test]
fn test_attached_property_residence_class_is_imported() {
    let text = "<?import forge.controls.Button?>\n\
        <?import forge.layout.GridPane?>\n\
        <GridPane>\n\
           <children>\n\
              <Button GridPane.rowIndex=\"1\" GridPane.columnIndex=\"0\"/>\n\
           </children>\n\
        </GridPane>\n";
    let mut doc = open(text).unwrap();
    let saved = doc.save(&SaveOptions::default());
    assert!(saved.contains("<?import forge.layout.GridPane?>"));
    // runtime carries the attached values under their qualified keys
    let button = doc.object_at_path(&[0]).unwrap();
    let runtime = doc.node(button).unwrap().runtime().unwrap();
    assert_eq!(
        doc.runtime_graph().value(runtime, "GridPane.rowIndex"),
        Some(&fxf_registry::Value::Text("1".to_string()))
    );
}

#[test]
fn test_style_revision_is_independent() {
    let mut doc = open("<?import forge.layout.VBox?>\n<VBox/>\n").unwrap();
    let scene = doc.scene_graph_revision();
    let style = doc.style_revision();
    doc.reapply_stylesheets();
    assert_eq!(doc.style_revision(), style + 1);
    assert_eq!(doc.scene_graph_revision(), scene);
    let root = doc.runtime_root().unwrap();
    assert!(doc
        .runtime_graph()
        .style_classes(root)
        .contains(&"root".to_string()));
}

#[test]
fn test_refresh_applies_root_style_class() {
    let mut doc = open("<?import forge.layout.VBox?>\n<VBox/>\n").unwrap();
    doc.refresh();
    let root = doc.runtime_root().unwrap();
    assert!(doc
        .runtime_graph()
        .style_classes(root)
        .contains(&"root".to_string()));
}

#[test]
fn test_refresh_on_empty_document_is_harmless() {
    let mut doc = FxomDocument::new(Arc::new(toolkit::standard_registry()));
    doc.refresh();
    assert!(doc.root().is_none());
    assert!(doc.runtime_root().is_none());
}

#[test]
fn test_default_text_content_feeds_default_property() {
    // SplitPane has a default property; Label text goes through the
    // dedicated property element form instead
    let text = "<?import forge.controls.Label?>\n<Label><text>inline</text></Label>\n";
    let doc = open(text).unwrap();
    let root = doc.root().unwrap();
    let runtime = doc.node(root).unwrap().runtime().unwrap();
    assert_eq!(
        doc.runtime_graph().value(runtime, "text"),
        Some(&fxf_registry::Value::Text("inline".to_string()))
    );
}

#[test]
fn test_next_free_id() {
    let doc = open(
        "<?import forge.controls.Button?>\n\
         <?import forge.layout.VBox?>\n\
         <VBox><children><Button fx:id=\"button\"/><Button fx:id=\"button1\"/></children></VBox>\n",
    )
    .unwrap();
    assert_eq!(doc.next_free_id("button"), "button2");
    assert_eq!(doc.next_free_id("label"), "label");
}
