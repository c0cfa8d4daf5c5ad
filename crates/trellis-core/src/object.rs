//! Widget identity and arena storage for the widget tree.
//!
//! Every widget lives in an [`ObjectTree`], a slotmap arena in which a parent
//! exclusively owns its children. Anything that refers to a widget without
//! owning it (an event target, the focus pointer, a focused-descendant
//! marker) holds a [`WidgetId`] and must resolve it through the tree before
//! use. Slotmap keys are generational, so an id whose widget has been
//! destroyed never aliases a newer widget.
//!
//! # Example
//!
//! ```
//! use trellis_core::ObjectTree;
//!
//! let mut tree = ObjectTree::new();
//! let root = tree.insert("root");
//! let child = tree.insert_child(root, "child").unwrap();
//!
//! assert_eq!(tree.parent(child).unwrap(), Some(root));
//! tree.remove(root).unwrap();
//! assert!(!tree.contains(child));
//! ```

use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

new_key_type! {
    /// A unique, generational identifier for a widget in an [`ObjectTree`].
    ///
    /// Ids stay valid while the tree changes shape and become permanently
    /// invalid once the widget is removed.
    pub struct WidgetId;
}

impl WidgetId {
    /// Convert the id to a raw u64 value.
    ///
    /// The raw value can be converted back using [`WidgetId::from_raw`].
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create a WidgetId from a raw u64 value.
    ///
    /// This does not check that the id exists in any tree.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Errors that can occur during tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ObjectError {
    /// The widget id is invalid or the widget has been destroyed.
    #[error("invalid or destroyed widget id")]
    InvalidWidgetId,
    /// Attempted to make a widget its own parent or ancestor.
    #[error("cannot set a widget as its own parent or ancestor")]
    CircularParentage,
}

/// Result type for tree operations.
pub type ObjectResult<T> = std::result::Result<T, ObjectError>;

struct Node<T> {
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    value: T,
}

/// Arena-backed tree with parent-owned children.
///
/// Removing a node removes its whole subtree. Children are kept in insertion
/// order, which is also their order along a layout axis.
pub struct ObjectTree<T> {
    nodes: SlotMap<WidgetId, Node<T>>,
}

impl<T> ObjectTree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Insert a new root node.
    pub fn insert(&mut self, value: T) -> WidgetId {
        let id = self.nodes.insert(Node {
            parent: None,
            children: Vec::new(),
            value,
        });
        tracing::trace!(target: "trellis_core::object", ?id, "inserted root widget");
        id
    }

    /// Insert a new node as the last child of `parent`.
    pub fn insert_child(&mut self, parent: WidgetId, value: T) -> ObjectResult<WidgetId> {
        if !self.nodes.contains_key(parent) {
            return Err(ObjectError::InvalidWidgetId);
        }
        let id = self.nodes.insert(Node {
            parent: Some(parent),
            children: Vec::new(),
            value,
        });
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        tracing::trace!(target: "trellis_core::object", ?id, ?parent, "inserted child widget");
        Ok(id)
    }

    /// Remove a node and all of its descendants.
    ///
    /// Returns the removed ids, descendants before their parents, ending with
    /// `id` itself.
    #[tracing::instrument(skip(self), target = "trellis_core::object", level = "trace")]
    pub fn remove(&mut self, id: WidgetId) -> ObjectResult<Vec<WidgetId>> {
        let mut removed = Vec::new();
        self.collect_postorder(id, &mut removed)?;

        if let Some(parent_id) = self.nodes.get(id).and_then(|node| node.parent) {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.children.retain(|&child| child != id);
            }
        }

        for &victim in &removed {
            self.nodes.remove(victim);
        }
        tracing::trace!(target: "trellis_core::object", ?id, removed = removed.len(), "removed subtree");
        Ok(removed)
    }

    /// Check whether a node exists.
    #[inline]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Borrow a node's value.
    #[inline]
    pub fn get(&self, id: WidgetId) -> Option<&T> {
        self.nodes.get(id).map(|node| &node.value)
    }

    /// Mutably borrow a node's value.
    #[inline]
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut T> {
        self.nodes.get_mut(id).map(|node| &mut node.value)
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: WidgetId) -> ObjectResult<Option<WidgetId>> {
        self.nodes
            .get(id)
            .map(|node| node.parent)
            .ok_or(ObjectError::InvalidWidgetId)
    }

    /// Get the children of a node in order.
    pub fn children(&self, id: WidgetId) -> ObjectResult<&[WidgetId]> {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .ok_or(ObjectError::InvalidWidgetId)
    }

    /// Move a node under a new parent, or make it a root with `None`.
    ///
    /// The node is appended to the new parent's children.
    pub fn set_parent(&mut self, id: WidgetId, new_parent: Option<WidgetId>) -> ObjectResult<()> {
        if !self.nodes.contains_key(id) {
            return Err(ObjectError::InvalidWidgetId);
        }
        if let Some(parent_id) = new_parent {
            if !self.nodes.contains_key(parent_id) {
                return Err(ObjectError::InvalidWidgetId);
            }
            if self.is_ancestor_of(id, parent_id) {
                return Err(ObjectError::CircularParentage);
            }
        }

        let old_parent = self.nodes.get(id).and_then(|node| node.parent);
        if let Some(old_parent_id) = old_parent {
            if let Some(parent) = self.nodes.get_mut(old_parent_id) {
                parent.children.retain(|&child| child != id);
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = new_parent;
        }
        if let Some(parent_id) = new_parent {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.children.push(id);
            }
        }
        Ok(())
    }

    /// Check whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_of(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == ancestor {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|node| node.parent);
        }
        false
    }

    /// All ancestors of a node, from the immediate parent to the root.
    pub fn ancestors(&self, id: WidgetId) -> ObjectResult<Vec<WidgetId>> {
        let mut current = self.parent(id)?;
        let mut result = Vec::new();
        while let Some(current_id) = current {
            result.push(current_id);
            current = self.nodes.get(current_id).and_then(|node| node.parent);
        }
        Ok(result)
    }

    /// Depth-first pre-order traversal: node first, then children in order.
    pub fn depth_first_preorder(&self, id: WidgetId) -> ObjectResult<Vec<WidgetId>> {
        let mut result = Vec::new();
        self.collect_preorder(id, &mut result)?;
        Ok(result)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over root nodes (nodes without a parent).
    pub fn roots(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
    }

    fn collect_preorder(&self, id: WidgetId, result: &mut Vec<WidgetId>) -> ObjectResult<()> {
        let node = self.nodes.get(id).ok_or(ObjectError::InvalidWidgetId)?;
        result.push(id);
        for &child in &node.children {
            self.collect_preorder(child, result)?;
        }
        Ok(())
    }

    fn collect_postorder(&self, id: WidgetId, result: &mut Vec<WidgetId>) -> ObjectResult<()> {
        let node = self.nodes.get(id).ok_or(ObjectError::InvalidWidgetId)?;
        for &child in &node.children {
            self.collect_postorder(child, result)?;
        }
        result.push(id);
        Ok(())
    }
}

impl<T> Default for ObjectTree<T> {
    fn default() -> Self {
        Self::new()
    }
}
