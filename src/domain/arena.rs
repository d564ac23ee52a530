use std::collections::BTreeSet;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, TreeResult};
use crate::domain::node::NodeId;

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    /// Identifier, unique within the tree
    pub id: NodeId,
    /// Payload for this node
    pub data: T,
    /// Index of parent node in the arena, None for the root node
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in sibling order
    pub children: Vec<Index>,
    pub is_current: bool,
    pub is_expanded: bool,
}

/// Edits recorded since the last flush.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Parent/child links or sibling order changed
    pub structural: bool,
    /// Nodes whose payload changed
    pub touched: BTreeSet<NodeId>,
    /// Nodes released from the tree
    pub removed: Vec<NodeId>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        !self.structural && self.touched.is_empty() && self.removed.is_empty()
    }

    pub(crate) fn mark_structural(&mut self) {
        self.structural = true;
    }

    /// Marks `id` as written. A reused id stops counting as removed.
    pub(crate) fn touch(&mut self, id: NodeId) {
        self.removed.retain(|&removed| removed != id);
        self.touched.insert(id);
    }

    pub(crate) fn record_removed(&mut self, id: NodeId) {
        self.structural = true;
        self.touched.remove(&id);
        self.removed.push(id);
    }
}

/// Arena-based tree structure for a single document hierarchy.
///
/// Uses a generational arena so node handles stay stable across edits and a
/// handle to a released node is detected instead of aliasing a new one.
/// Each arena holds exactly one tree.
#[derive(Debug, Clone)]
pub struct TreeArena<T> {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode<T>>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
    changes: ChangeSet,
}

impl<T> Default for TreeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeArena<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            changes: ChangeSet::default(),
        }
    }

    /// Inserts a node as the last child of `parent`, or as the root when `parent` is None.
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_node(&mut self, id: NodeId, data: T, parent: Option<Index>) -> Index {
        let node = TreeNode {
            id,
            data,
            parent,
            children: Vec::new(),
            is_current: false,
            is_expanded: true,
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode<T>> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode<T>> {
        self.arena.get_mut(idx)
    }

    /// Like [`get_node`](Self::get_node), but a released handle is an error.
    pub fn node(&self, idx: Index) -> TreeResult<&TreeNode<T>> {
        self.arena.get(idx).ok_or(DomainError::StaleHandle)
    }

    pub fn node_mut(&mut self, idx: Index) -> TreeResult<&mut TreeNode<T>> {
        self.arena.get_mut(idx).ok_or(DomainError::StaleHandle)
    }

    pub(crate) fn remove_node(&mut self, idx: Index) -> Option<TreeNode<T>> {
        self.arena.remove(idx)
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    /// Number of live nodes held by the arena.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub(crate) fn changes_mut(&mut self) -> &mut ChangeSet {
        &mut self.changes
    }

    pub fn clear_changes(&mut self) {
        self.changes = ChangeSet::default();
    }

    /// Pre-order iterator over the whole tree.
    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order iterator over the subtree rooted at `start`.
    pub fn iter_subtree(&self, start: Index) -> TreeIterator<'_, T> {
        TreeIterator::new(self, Some(start))
    }

    /// Post-order iterator over the subtree rooted at `start`.
    pub fn iter_postorder(&self, start: Index) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self, Some(start))
    }

    /// Number of levels in the tree; a lone root has height 1, an empty tree 0.
    #[instrument(level = "debug", skip(self))]
    pub fn height(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_height(root)
        } else {
            0
        }
    }

    fn calculate_height(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_height(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Collects all leaf nodes (nodes with no children) in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(idx, _)| idx)
            .collect()
    }
}

pub struct TreeIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<Index>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<(Index, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.map(|idx| (idx, false)).into_iter().collect(),
        }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
