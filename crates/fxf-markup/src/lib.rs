//! FXForge Markup Tree
//!
//! Generic, order-preserving XML-dialect tree. Nodes carry no semantic
//! meaning; the FXOM layer overlays typing on top of this crate.

mod document;
mod node;
mod parse;
mod serialize;
mod tree;

pub use document::XmlDocument;
pub use node::{ElementData, XmlData, XmlNode};
pub use parse::parse;
pub use serialize::{normalize_indentation, serialize};
pub use tree::XmlTree;

/// Node identifier (index into the tree arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XmlId(pub(crate) u32);

impl XmlId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Markup tree errors
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("Malformed markup at byte {position}: {message}")]
    Parse {
        position: u64,
        message: String,
        #[source]
        source: Option<quick_xml::Error>,
    },

    #[error("Document has more than one root element")]
    MultipleRoots,

    #[error("Text content outside the root element")]
    TextOutsideRoot,

    #[error("Node not found in tree")]
    NotFound,

    #[error("Node is not an element")]
    NotAnElement,

    #[error("Node is not a child of the given parent")]
    NotAChild,

    #[error("Re-parenting a node under its own descendant")]
    HierarchyViolation,

    #[error("Child index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Result type for markup tree operations
pub type MarkupResult<T> = Result<T, MarkupError>;
