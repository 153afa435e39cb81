//! Comprehensive tests for fxf-om
//!
//! Round-trip fidelity, import management, refresh identity stability and
//! the structural editing operations, all against the standard toolkit.

use std::collections::HashMap;
use std::sync::Arc;

use fxf_om::{FxomDocument, PropertyName, SaveOptions};
use fxf_registry::toolkit;

const CANONICAL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<?import forge.controls.Button?>\n\
<?import forge.layout.VBox?>\n\
<VBox spacing=\"4\" xmlns=\"http://fxforge.io/ui\" xmlns:fx=\"http://fxforge.io/fxml/1\">\n\
   <children>\n\
      <Button fx:id=\"first\" text=\"One\"/>\n\
      <Button fx:id=\"second\" text=\"Two\"/>\n\
   </children>\n\
</VBox>\n";

fn open(text: &str) -> FxomDocument {
    FxomDocument::open(text, Arc::new(toolkit::standard_registry())).expect("document loads")
}

#[test]
fn test_round_trip_canonical_document() {
    let mut doc = open(CANONICAL);
    assert_eq!(doc.save(&SaveOptions::default()), CANONICAL);
}

#[test]
fn test_save_is_idempotent_on_messy_input() {
    let messy = "<?import forge.layout.VBox?>\n\
        <?import forge.controls.Label?>\n\
        <?import forge.controls.Button?>\n\
        <VBox><children><Button text=\"Hi\"/></children></VBox>\n";
    let first = open(messy).save(&SaveOptions::default());
    let second = open(&first).save(&SaveOptions::default());
    assert_eq!(first, second);
}

#[test]
fn test_import_minimality() {
    let mut doc = open(CANONICAL);
    let saved = doc.save(&SaveOptions::default());
    let markup = fxf_markup::parse(&saved).unwrap();
    let imports: Vec<String> = markup
        .header_instructions("import")
        .into_iter()
        .map(|(_, directive)| directive)
        .collect();
    assert_eq!(
        imports,
        vec![
            "forge.controls.Button".to_string(),
            "forge.layout.VBox".to_string(),
        ]
    );
}

#[test]
fn test_unused_imports_are_dropped() {
    let text = "<?import forge.controls.Button?>\n\
        <?import forge.controls.Label?>\n\
        <?import forge.layout.VBox?>\n\
        <VBox><children><Button/></children></VBox>\n";
    let mut doc = open(text);
    let saved = doc.save(&SaveOptions::default());
    assert!(!saved.contains("forge.controls.Label"));
    assert!(saved.contains("<?import forge.controls.Button?>"));
}

#[test]
fn test_wildcard_imports() {
    let mut doc = open(CANONICAL);
    let saved = doc.save(&SaveOptions {
        wildcard_imports: true,
        normalize_indentation: false,
    });
    let markup = fxf_markup::parse(&saved).unwrap();
    let imports: Vec<String> = markup
        .header_instructions("import")
        .into_iter()
        .map(|(_, directive)| directive)
        .collect();
    assert_eq!(
        imports,
        vec!["forge.controls.*".to_string(), "forge.layout.*".to_string()]
    );
    for import in imports {
        assert!(import.ends_with(".*"));
    }
}

#[test]
fn test_import_splice_preserves_other_header_nodes() {
    let text = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
        <!-- editor document -->\n\
        <?import forge.layout.VBox?>\n\
        <?language javascript?>\n\
        <VBox/>\n";
    let mut doc = open(text);
    let saved = doc.save(&SaveOptions::default());
    let comment_pos = saved.find("<!-- editor document -->").unwrap();
    let import_pos = saved.find("<?import forge.layout.VBox?>").unwrap();
    let language_pos = saved.find("<?language javascript?>").unwrap();
    assert!(comment_pos < import_pos);
    assert!(import_pos < language_pos);
}

#[test]
fn test_empty_document() {
    let registry = Arc::new(toolkit::standard_registry());
    let mut doc = FxomDocument::new(registry.clone());
    assert_eq!(doc.save(&SaveOptions::default()), "");

    let mut loaded = FxomDocument::open("", registry).unwrap();
    assert!(loaded.root().is_none());
    assert_eq!(loaded.save(&SaveOptions::default()), "");
}

#[test]
fn test_identity_stability_across_refresh() {
    let mut doc = open(CANONICAL);
    let second = doc.object_at_path(&[1]).unwrap();
    assert_eq!(doc.fx_id(second), Some("second"));
    let runtime_before = doc.node(second).unwrap().runtime();

    doc.edit(|d| {
        d.set_text_property(second, PropertyName::new("text"), "Renamed")
            .unwrap();
    });

    let after = doc.object_at_path(&[1]).unwrap();
    assert_eq!(after, second, "node identity must survive the refresh");
    assert_eq!(doc.fx_id(after), Some("second"));
    // the wrapped runtime object is rebuilt and may differ
    let runtime_after = doc.node(after).unwrap().runtime();
    assert!(runtime_after.is_some());
    let _ = runtime_before;

    let graph = doc.runtime_graph();
    let value = graph.value(runtime_after.unwrap(), "text");
    assert_eq!(value, Some(&fxf_registry::Value::Text("Renamed".to_string())));
}

#[test]
fn test_nested_update_scopes_coalesce_into_one_refresh() {
    let mut doc = open(CANONICAL);
    let first = doc.object_at_path(&[0]).unwrap();
    let second = doc.object_at_path(&[1]).unwrap();
    let before = doc.scene_graph_revision();

    doc.edit(|d| {
        d.set_text_property(first, PropertyName::new("text"), "A").unwrap();
        d.edit(|d| {
            d.set_text_property(second, PropertyName::new("text"), "B").unwrap();
        });
        assert!(d.update_depth() > 0);
    });

    assert_eq!(doc.scene_graph_revision(), before + 1);
}

#[test]
fn test_cross_document_move_renames_colliding_ids() {
    let source_text = "<?import forge.controls.Button?>\n\
        <?import forge.controls.Label?>\n\
        <?import forge.layout.VBox?>\n\
        <VBox>\n\
           <children>\n\
              <Button fx:id=\"a\" text=\"$a\"/>\n\
              <Label fx:id=\"b\"/>\n\
              <fx:reference source=\"a\"/>\n\
           </children>\n\
        </VBox>\n";
    let target_text = "<?import forge.controls.Button?>\n\
        <?import forge.layout.VBox?>\n\
        <VBox>\n\
           <children>\n\
              <Button fx:id=\"a\"/>\n\
           </children>\n\
        </VBox>\n";
    let source = open(source_text);
    let mut target = open(target_text);

    let moved_root = source.root().unwrap();
    let adopted = target.adopt_subtree(&source, moved_root).unwrap();

    let adopted_ids: Vec<String> = target
        .descendants(adopted)
        .into_iter()
        .filter_map(|id| target.fx_id(id).map(str::to_string))
        .collect();
    assert!(!adopted_ids.contains(&"a".to_string()), "colliding id renamed");
    assert!(adopted_ids.contains(&"b".to_string()), "non-colliding id untouched");
    assert!(adopted_ids.contains(&"a1".to_string()));

    // references inside the moved subtree follow the rename
    let mut binding_seen = false;
    let mut source_seen = false;
    for id in target.descendants(adopted) {
        let node = target.node(id).unwrap();
        if let Some(instance) = node.as_instance() {
            for &prop in instance.properties.values() {
                if target.property(prop).unwrap().text() == Some("$a1") {
                    binding_seen = true;
                }
            }
        }
        if let Some(intrinsic) = node.as_intrinsic() {
            for &prop in intrinsic.properties.values() {
                if target.property(prop).unwrap().text() == Some("a1") {
                    source_seen = true;
                }
            }
        }
    }
    assert!(binding_seen, "binding expression updated to $a1");
    assert!(source_seen, "intrinsic source updated to a1");
}

#[test]
fn test_end_to_end_wrap_button_in_new_container() {
    let mut doc = open(CANONICAL);
    let root = doc.root().unwrap();
    let first = doc.object_at_path(&[0]).unwrap();

    let wrapper = doc.new_instance("forge.layout.HBox").unwrap();
    doc.edit(|d| {
        d.remove_object(first).unwrap();
        d.insert_object(wrapper, root, PropertyName::new("children"), 0).unwrap();
        d.insert_object(first, wrapper, PropertyName::new("children"), 0).unwrap();
    });

    let saved = doc.save(&SaveOptions {
        wildcard_imports: false,
        normalize_indentation: true,
    });

    assert!(saved.contains("<?import forge.layout.HBox?>"));
    assert!(saved.contains("<HBox>"));
    let hbox_pos = saved.find("<HBox>").unwrap();
    let vbox_pos = saved.find("<VBox").unwrap();
    assert!(vbox_pos < hbox_pos, "wrapper nested inside the original container");
    assert!(saved.contains("fx:id=\"first\""));
    assert!(saved.contains("fx:id=\"second\""));
    assert_eq!(saved.matches("fx:id=\"first\"").count(), 1);
    assert_eq!(saved.matches("fx:id=\"second\"").count(), 1);

    // wrapper is at index 0 with the moved button inside it
    let wrapped = doc.object_at_path(&[0, 0]).unwrap();
    assert_eq!(wrapped, first);
    assert_eq!(doc.object_at_path(&[1]).unwrap(), doc.lookup_id("second").unwrap());
}

#[test]
fn test_resource_substitution_applies_to_runtime_only() {
    let text = "<?import forge.controls.Button?>\n<Button text=\"%greeting\"/>\n";
    let resources: HashMap<String, String> =
        [("greeting".to_string(), "Hello".to_string())].into_iter().collect();
    let mut doc = FxomDocument::open_with_resources(
        text,
        Arc::new(toolkit::standard_registry()),
        Some(resources),
        None,
    )
    .unwrap();

    let root = doc.root().unwrap();
    let runtime = doc.node(root).unwrap().runtime().unwrap();
    assert_eq!(
        doc.runtime_graph().value(runtime, "text"),
        Some(&fxf_registry::Value::Text("Hello".to_string()))
    );
    // the document text keeps the resource key
    assert!(doc.save(&SaveOptions::default()).contains("text=\"%greeting\""));
}

#[test]
fn test_window_content_is_detached_for_display() {
    let text = "<?import forge.controls.Button?>\n\
        <?import forge.stage.Window?>\n\
        <Window title=\"Main\">\n\
           <content>\n\
              <Button text=\"Go\"/>\n\
           </content>\n\
        </Window>\n";
    let doc = open(text);

    let runtime_root = doc.runtime_root().unwrap();
    let display = doc.display_node().unwrap();
    assert_ne!(display, runtime_root);

    let graph = doc.runtime_graph();
    let registry = doc.registry();
    let display_type = graph.get(display).unwrap().type_id;
    assert_eq!(
        registry.descriptor(display_type).qualified_name,
        "forge.controls.Button"
    );
    let Some(fxf_registry::Value::Object(stand_in)) = graph.value(runtime_root, "content") else {
        panic!("window content replaced by placeholder");
    };
    let stand_in_type = graph.get(*stand_in).unwrap().type_id;
    assert_eq!(
        registry.descriptor(stand_in_type).qualified_name,
        toolkit::PLACEHOLDER_TYPE
    );
}

#[test]
fn test_fx_root_loads_with_declared_type() {
    let text = "<?import forge.controls.Button?>\n\
        <fx:root type=\"forge.layout.VBox\">\n\
           <children>\n\
              <Button text=\"Go\"/>\n\
           </children>\n\
        </fx:root>\n";
    let mut doc = open(text);
    let root = doc.root().unwrap();
    let instance = doc.node(root).unwrap().as_instance().unwrap();
    assert_eq!(instance.declared_name, "forge.layout.VBox");

    // fx:root survives a save and the import set covers the declared type
    let saved = doc.save(&SaveOptions::default());
    assert!(saved.contains("<fx:root type=\"forge.layout.VBox\""));
    assert!(saved.contains("<?import forge.layout.VBox?>"));
}

#[test]
fn test_collection_root() {
    let text = "<?import forge.collections.ArrayList?>\n\
        <?import forge.controls.Button?>\n\
        <ArrayList>\n\
           <Button text=\"One\"/>\n\
           <Button text=\"Two\"/>\n\
        </ArrayList>\n";
    let doc = open(text);
    let root = doc.root().unwrap();
    let collection = doc.node(root).unwrap().as_collection().unwrap();
    assert_eq!(collection.items.len(), 2);
}

#[test]
fn test_reference_aliases_runtime_object() {
    let text = "<?import forge.controls.Button?>\n\
        <?import forge.layout.VBox?>\n\
        <VBox>\n\
           <children>\n\
              <Button fx:id=\"origin\" text=\"Go\"/>\n\
              <fx:reference source=\"origin\"/>\n\
              <fx:copy source=\"origin\"/>\n\
           </children>\n\
        </VBox>\n";
    let doc = open(text);
    let origin = doc.object_at_path(&[0]).unwrap();
    let reference = doc.object_at_path(&[1]).unwrap();
    let copy = doc.object_at_path(&[2]).unwrap();

    let origin_runtime = doc.node(origin).unwrap().runtime().unwrap();
    assert_eq!(doc.node(reference).unwrap().runtime(), Some(origin_runtime));

    let copy_runtime = doc.node(copy).unwrap().runtime().unwrap();
    assert_ne!(copy_runtime, origin_runtime);
    assert_eq!(
        doc.runtime_graph().value(copy_runtime, "text"),
        Some(&fxf_registry::Value::Text("Go".to_string()))
    );
}

#[test]
fn test_include_expands_from_location() {
    let dir = tempfile::tempdir().unwrap();
    let included = "<?import forge.controls.Label?>\n<Label text=\"from include\"/>\n";
    std::fs::write(dir.path().join("part.fxml"), included).unwrap();
    let main = "<?import forge.layout.VBox?>\n\
        <VBox>\n\
           <children>\n\
              <fx:include source=\"part.fxml\"/>\n\
           </children>\n\
        </VBox>\n";
    let main_path = dir.path().join("main.fxml");
    std::fs::write(&main_path, main).unwrap();

    let doc = FxomDocument::open_with_resources(
        main,
        Arc::new(toolkit::standard_registry()),
        None,
        Some(main_path),
    )
    .unwrap();

    let include = doc.object_at_path(&[0]).unwrap();
    let runtime = doc.node(include).unwrap().runtime().expect("include resolved");
    assert_eq!(
        doc.runtime_graph().value(runtime, "text"),
        Some(&fxf_registry::Value::Text("from include".to_string()))
    );
}

#[test]
fn test_missing_include_target_stays_unresolved() {
    let main = "<?import forge.layout.VBox?>\n\
        <VBox>\n\
           <children>\n\
              <fx:include source=\"nowhere.fxml\"/>\n\
           </children>\n\
        </VBox>\n";
    let mut doc = open(main);
    let include = doc.object_at_path(&[0]).unwrap();
    assert!(doc.node(include).unwrap().runtime().is_none());

    // the document still saves, keeping the directive
    let saved = doc.save(&SaveOptions::default());
    assert!(saved.contains("<fx:include source=\"nowhere.fxml\"/>"));
}

#[test]
fn test_root_replacement_demotes_old_root() {
    let text = "<?import forge.layout.VBox?>\n\
        <VBox fx:controller=\"demo.MainController\" xmlns=\"http://fxforge.io/ui\" xmlns:fx=\"http://fxforge.io/fxml/1\"/>\n";
    let mut doc = open(text);
    let old_root = doc.root().unwrap();
    assert_eq!(doc.controller_name(), Some("demo.MainController"));

    let new_root = doc.new_instance("forge.layout.StackPane").unwrap();
    doc.edit(|d| d.set_root(Some(new_root)).unwrap());

    assert_eq!(doc.root(), Some(new_root));
    let old_element = doc.node(old_root).unwrap().element();
    let old = doc.markup().tree().element(old_element).unwrap();
    assert_eq!(old.attribute("fx:controller"), None);
    assert_eq!(old.attribute("xmlns"), None);
    assert_eq!(old.attribute("xmlns:fx"), None);

    let saved = doc.save(&SaveOptions::default());
    assert!(saved.contains("<StackPane"));
    assert!(!saved.contains("VBox"));
}
