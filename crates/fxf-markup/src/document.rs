//! Markup document - tree plus header bookkeeping

use crate::node::XmlData;
use crate::tree::XmlTree;
use crate::XmlId;

/// A markup document: header nodes, at most one root element, and the
/// arena all of them live in.
#[derive(Debug, Default, Clone)]
pub struct XmlDocument {
    tree: XmlTree,
    /// Processing instructions and comments preceding the root element
    header: Vec<XmlId>,
    root: Option<XmlId>,
    /// Comments/processing instructions after the root element, if any
    trailer: Vec<XmlId>,
}

impl XmlDocument {
    /// Create an empty document (no root, no header)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut XmlTree {
        &mut self.tree
    }

    pub fn root(&self) -> Option<XmlId> {
        self.root
    }

    /// Install a new root element (or clear it)
    pub fn set_root(&mut self, root: Option<XmlId>) {
        self.root = root;
    }

    pub fn header(&self) -> &[XmlId] {
        &self.header
    }

    pub fn trailer(&self) -> &[XmlId] {
        &self.trailer
    }

    /// Append a node to the header
    pub fn push_header_node(&mut self, node: XmlId) {
        self.header.push(node);
    }

    /// Insert a node into the header at an index
    pub fn insert_header_node(&mut self, index: usize, node: XmlId) {
        self.header.insert(index.min(self.header.len()), node);
    }

    /// Remove a node from the header; true when it was present
    pub fn remove_header_node(&mut self, node: XmlId) -> bool {
        match self.header.iter().position(|&n| n == node) {
            Some(pos) => {
                self.header.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn push_trailer_node(&mut self, node: XmlId) {
        self.trailer.push(node);
    }

    /// Header processing instructions with the given target, in order
    pub fn header_instructions(&self, target: &str) -> Vec<(XmlId, String)> {
        self.header
            .iter()
            .filter_map(|&id| match self.tree.get(id).map(|n| n.data()) {
                Some(XmlData::ProcessingInstruction { target: t, data }) if t == target => {
                    Some((id, data.clone()))
                }
                _ => None,
            })
            .collect()
    }
}
