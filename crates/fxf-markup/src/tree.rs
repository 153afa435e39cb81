//! Markup tree (arena-based allocation)
//!
//! Nodes are addressed by stable `XmlId` handles; re-parenting is an
//! index-table update on the two affected child lists, never pointer surgery.
//! Removed subtrees stay in the arena until the tree is dropped, so handles
//! held by consumers never dangle.

use crate::node::{ElementData, XmlData, XmlNode};
use crate::{MarkupError, MarkupResult, XmlId};

/// Arena-based markup tree
#[derive(Debug, Default, Clone)]
pub struct XmlTree {
    nodes: Vec<XmlNode>,
}

impl XmlTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Get a node by id
    pub fn get(&self, id: XmlId) -> Option<&XmlNode> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by id
    pub fn get_mut(&mut self, id: XmlId) -> Option<&mut XmlNode> {
        self.nodes.get_mut(id.index())
    }

    /// Element data of a node, if it is an element
    pub fn element(&self, id: XmlId) -> Option<&ElementData> {
        self.get(id).and_then(XmlNode::as_element)
    }

    /// Mutable element data of a node, if it is an element
    pub fn element_mut(&mut self, id: XmlId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(XmlNode::as_element_mut)
    }

    /// Parent of a node
    pub fn parent(&self, id: XmlId) -> Option<XmlId> {
        self.get(id).and_then(XmlNode::parent)
    }

    /// Ordered children of an element (empty for non-elements)
    pub fn children(&self, id: XmlId) -> &[XmlId] {
        self.element(id).map(ElementData::children).unwrap_or(&[])
    }

    /// Number of nodes ever allocated in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached element node
    pub fn create_element(&mut self, name: impl Into<String>) -> XmlId {
        self.push(XmlData::Element(ElementData::new(name)))
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, content: impl Into<String>) -> XmlId {
        self.push(XmlData::Text(content.into()))
    }

    /// Allocate a detached comment node
    pub fn create_comment(&mut self, content: impl Into<String>) -> XmlId {
        self.push(XmlData::Comment(content.into()))
    }

    /// Allocate a detached processing instruction node
    pub fn create_pi(&mut self, target: impl Into<String>, data: impl Into<String>) -> XmlId {
        self.push(XmlData::ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        })
    }

    fn push(&mut self, data: XmlData) -> XmlId {
        let id = XmlId(self.nodes.len() as u32);
        self.nodes.push(XmlNode { parent: None, data });
        id
    }

    /// Append a child to an element
    pub fn append_child(&mut self, parent: XmlId, child: XmlId) -> MarkupResult<()> {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child)
    }

    /// Insert a child at an index, detaching it from any previous parent.
    ///
    /// Both child lists are updated before this returns; there is no state
    /// in which the node is reachable from two parents.
    pub fn insert_child(&mut self, parent: XmlId, index: usize, child: XmlId) -> MarkupResult<()> {
        if self.get(child).is_none() {
            return Err(MarkupError::NotFound);
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(MarkupError::HierarchyViolation);
        }
        self.detach(child)?;
        let element = self.element_mut(parent).ok_or(MarkupError::NotAnElement)?;
        let len = element.children.len();
        if index > len {
            return Err(MarkupError::IndexOutOfBounds { index, len });
        }
        element.children.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    /// Detach a node from its parent (no-op when already detached)
    pub fn detach(&mut self, node: XmlId) -> MarkupResult<()> {
        let Some(parent) = self.parent(node) else {
            return Ok(());
        };
        let element = self.element_mut(parent).ok_or(MarkupError::NotAnElement)?;
        let pos = element
            .children
            .iter()
            .position(|&c| c == node)
            .ok_or(MarkupError::NotAChild)?;
        element.children.remove(pos);
        self.nodes[node.index()].parent = None;
        Ok(())
    }

    /// Remove a child from a specific parent
    pub fn remove_child(&mut self, parent: XmlId, child: XmlId) -> MarkupResult<()> {
        if self.parent(child) != Some(parent) {
            return Err(MarkupError::NotAChild);
        }
        self.detach(child)
    }

    /// Move a node under a new parent at the given index
    pub fn reparent(&mut self, node: XmlId, new_parent: XmlId, index: usize) -> MarkupResult<()> {
        self.insert_child(new_parent, index, node)
    }

    /// Index of a node within its parent's child list
    pub fn child_index(&self, node: XmlId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    /// True when `ancestor` lies on the parent chain of `node`
    pub fn is_ancestor(&self, ancestor: XmlId, node: XmlId) -> bool {
        let mut cursor = self.parent(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// Deep-copy a subtree, returning the detached copy's root
    pub fn clone_subtree(&mut self, node: XmlId) -> MarkupResult<XmlId> {
        let data = self.get(node).ok_or(MarkupError::NotFound)?.data.clone();
        match data {
            XmlData::Element(element) => {
                let children = element.children.clone();
                let mut copy = element;
                copy.children = Vec::new();
                let copy_id = self.push(XmlData::Element(copy));
                for child in children {
                    let child_copy = self.clone_subtree(child)?;
                    self.append_child(copy_id, child_copy)?;
                }
                Ok(copy_id)
            }
            other => Ok(self.push(other)),
        }
    }

    /// Deep-copy a subtree from another tree into this one, returning the
    /// detached copy's root
    pub fn clone_subtree_from(&mut self, other: &XmlTree, node: XmlId) -> MarkupResult<XmlId> {
        let data = other.get(node).ok_or(MarkupError::NotFound)?.data.clone();
        match data {
            XmlData::Element(element) => {
                let children = element.children.clone();
                let mut copy = element;
                copy.children = Vec::new();
                let copy_id = self.push(XmlData::Element(copy));
                for child in children {
                    let child_copy = self.clone_subtree_from(other, child)?;
                    self.append_child(copy_id, child_copy)?;
                }
                Ok(copy_id)
            }
            other_data => Ok(self.push(other_data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_reparent() {
        let mut tree = XmlTree::new();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let c = tree.create_element("c");
        tree.append_child(a, b).unwrap();
        tree.append_child(a, c).unwrap();
        assert_eq!(tree.children(a), &[b, c]);

        tree.reparent(c, a, 0).unwrap();
        assert_eq!(tree.children(a), &[c, b]);
        assert_eq!(tree.parent(c), Some(a));
    }

    #[test]
    fn test_reparent_across_elements_detaches() {
        let mut tree = XmlTree::new();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let t = tree.create_text("x");
        tree.append_child(a, t).unwrap();
        tree.reparent(t, b, 0).unwrap();
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[t]);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = XmlTree::new();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        tree.append_child(a, b).unwrap();
        assert!(matches!(
            tree.insert_child(b, 0, a),
            Err(MarkupError::HierarchyViolation)
        ));
    }

    #[test]
    fn test_clone_subtree_is_detached() {
        let mut tree = XmlTree::new();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        tree.append_child(a, b).unwrap();
        let copy = tree.clone_subtree(a).unwrap();
        assert_ne!(copy, a);
        assert_eq!(tree.parent(copy), None);
        assert_eq!(tree.children(copy).len(), 1);
    }
}
