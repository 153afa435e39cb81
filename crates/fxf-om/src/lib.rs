//! FXForge Object Model (FXOM)
//!
//! Typed overlay on the markup tree: instances, properties, and intrinsic
//! directives, kept in lockstep with a constructed runtime object graph.
//! Consumers hold `FxomId` handles whose identity survives refreshes.

mod document;
mod edit;
mod ids;
mod import_remover;
mod loader;
mod object;
mod property;
mod refresher;
mod saver;

pub use document::{FxomDocument, KnownError, KnownErrorHandler};
pub use import_remover::remove_imports;
pub use object::{CollectionData, FxomData, FxomNode, FxomParent, InstanceData, IntrinsicData, IntrinsicKind};
pub use property::{FxomProperty, PropertyName, PropertyStore, PropertyValue};
pub use saver::SaveOptions;

/// The two standard namespace attributes every saved root element carries
pub const UI_NAMESPACE: &str = "http://fxforge.io/ui";
pub const FX_NAMESPACE: &str = "http://fxforge.io/fxml/1";

/// Object identifier (index into the document's node arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FxomId(pub(crate) u32);

impl FxomId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Property identifier (index into the document's property arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropId(pub(crate) u32);

impl PropId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Object model errors
#[derive(Debug, thiserror::Error)]
pub enum FxomError {
    /// Malformed markup or an unresolvable required type; the document is
    /// left with no root
    #[error("Failed to load document: {message}")]
    Load {
        message: String,
        #[source]
        source: Option<fxf_markup::MarkupError>,
    },

    #[error("Unresolvable type: {0}")]
    UnresolvableType(String),

    #[error("No such object in this document")]
    UnknownObject,

    #[error("Object is not an instance")]
    NotAnInstance,

    #[error("Object is not a collection")]
    NotACollection,

    #[error("Property {0} is not object-valued")]
    NotAnObjectProperty(String),

    #[error("Property {0} is not text-valued")]
    NotATextProperty(String),

    #[error("Value index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Object is still attached to a parent")]
    StillAttached,

    #[error("fx:id {0} is already used in this document")]
    DuplicateId(String),

    #[error(transparent)]
    Markup(#[from] fxf_markup::MarkupError),
}

/// Result type for object model operations
pub type FxomResult<T> = Result<T, FxomError>;
