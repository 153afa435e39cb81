//! Built-in toolkit descriptor set
//!
//! The widget catalog the demo tool and the test suites resolve against.
//! Nothing in the document model depends on these specific types; they go
//! through the same registry surface a caller-supplied catalog would.

use crate::descriptor::{Registry, TypeDescriptor};

/// Qualified name of the placeholder substituted for detached window content
pub const PLACEHOLDER_TYPE: &str = "forge.internal.Placeholder";

/// Build a registry populated with the standard toolkit
pub fn standard_registry() -> Registry {
    let mut registry = Registry::new();

    for name in ["Button", "Label", "CheckBox"] {
        registry.register(
            TypeDescriptor::new(format!("forge.controls.{name}"))
                .value_property("text")
                .value_property("styleClass")
                .handle_property("graphic")
                .value_property("onAction"),
        );
    }
    registry.register(
        TypeDescriptor::new("forge.controls.TextField")
            .value_property("text")
            .value_property("promptText")
            .value_property("styleClass"),
    );
    registry.register(
        TypeDescriptor::new("forge.controls.Slider")
            .value_property("min")
            .value_property("max")
            .value_property("value")
            .value_property("styleClass"),
    );

    for name in ["VBox", "HBox"] {
        registry.register(
            TypeDescriptor::new(format!("forge.layout.{name}"))
                .list_property("children")
                .default_property("children")
                .value_property("spacing")
                .value_property("styleClass"),
        );
    }
    registry.register(
        TypeDescriptor::new("forge.layout.StackPane")
            .list_property("children")
            .default_property("children")
            .value_property("styleClass")
            .free_children(),
    );
    registry.register(
        TypeDescriptor::new("forge.layout.Pane")
            .list_property("children")
            .default_property("children")
            .value_property("styleClass")
            .free_children(),
    );
    registry.register(
        TypeDescriptor::new("forge.layout.AnchorPane")
            .list_property("children")
            .default_property("children")
            .value_property("styleClass")
            .free_children()
            .attached_property("topAnchor")
            .attached_property("bottomAnchor")
            .attached_property("leftAnchor")
            .attached_property("rightAnchor"),
    );
    registry.register(
        TypeDescriptor::new("forge.layout.GridPane")
            .list_property("children")
            .default_property("children")
            .value_property("hgap")
            .value_property("vgap")
            .value_property("styleClass")
            .attached_property("rowIndex")
            .attached_property("columnIndex")
            .attached_property("rowSpan")
            .attached_property("columnSpan"),
    );
    registry.register(
        TypeDescriptor::new("forge.layout.SplitPane")
            .list_property("items")
            .default_property("items")
            .value_property_with_default("orientation", "HORIZONTAL")
            .layout_synced_property("dividerPositions")
            .value_property("styleClass"),
    );
    registry.register(
        TypeDescriptor::new("forge.layout.ScrollPane")
            .handle_property("content")
            .default_property("content")
            .value_property("styleClass"),
    );

    registry.register(
        TypeDescriptor::new("forge.stage.Window")
            .handle_property("content")
            .default_property("content")
            .value_property("title")
            .value_property("width")
            .value_property("height")
            .window_like(),
    );

    registry.register(
        TypeDescriptor::new("forge.collections.ArrayList")
            .collection()
            .list_property("items")
            .default_property("items"),
    );
    registry.register(TypeDescriptor::new("forge.lang.String").value_property("value"));

    registry.register(TypeDescriptor::new(PLACEHOLDER_TYPE));

    tracing::debug!(types = registry.len(), "standard toolkit registered");
    registry
}
