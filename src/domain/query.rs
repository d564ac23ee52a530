//! Read-only traversals plus current-node marking.
//!
//! Queries that take a handle work from any node in the tree: they ascend to
//! the root first, so the answer does not depend on where they are invoked.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::TreeArena;
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::node::NodeId;

impl<T> TreeArena<T> {
    /// Follows parent links from `idx` up to the unparented node.
    pub fn root_of(&self, idx: Index) -> TreeResult<Index> {
        let mut current = idx;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Ancestors of `idx`, nearest first. The root has none.
    pub fn ancestors(&self, idx: Index) -> TreeResult<Vec<Index>> {
        let mut ancestors = Vec::new();
        let mut current = self.node(idx)?.parent;
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.node(parent)?.parent;
        }
        Ok(ancestors)
    }

    /// Parent hops from `idx` to the root; the root has depth 0.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self, idx: Index) -> TreeResult<usize> {
        Ok(self.ancestors(idx)?.len())
    }

    /// Returns an id not used anywhere in the tree containing `idx`: `max(ids) + 1`.
    ///
    /// Fails with [`DomainError::IdSpaceExhausted`] once the largest id is `NodeId::MAX`.
    #[instrument(level = "debug", skip(self))]
    pub fn unique_id(&self, idx: Index) -> TreeResult<NodeId> {
        let root = self.root_of(idx)?;
        let max = self.max_id(root);
        max.checked_add(1).ok_or(DomainError::IdSpaceExhausted(max))
    }

    /// Counts every node reachable from the root of the tree containing `idx`, root included.
    #[instrument(level = "debug", skip(self))]
    pub fn total_count(&self, idx: Index) -> TreeResult<usize> {
        let root = self.root_of(idx)?;
        Ok(self.count_from(root))
    }

    fn max_id(&self, idx: Index) -> NodeId {
        match self.get_node(idx) {
            Some(node) => node
                .children
                .iter()
                .map(|&child| self.max_id(child))
                .fold(node.id, NodeId::max),
            None => NodeId::MIN,
        }
    }

    fn count_from(&self, idx: Index) -> usize {
        match self.get_node(idx) {
            Some(node) => {
                1 + node
                    .children
                    .iter()
                    .map(|&child| self.count_from(child))
                    .sum::<usize>()
            }
            None => 0,
        }
    }

    /// True when `node` is `subtree_root` itself or one of its descendants.
    pub fn is_in_subtree(&self, node: Index, subtree_root: Index) -> TreeResult<bool> {
        if node == subtree_root {
            return Ok(true);
        }
        Ok(self.ancestors(node)?.contains(&subtree_root))
    }

    /// Position of `idx` among its siblings, with the parent handle.
    /// None for the root.
    pub fn sibling_position(&self, idx: Index) -> TreeResult<Option<(Index, usize)>> {
        let Some(parent) = self.node(idx)?.parent else {
            return Ok(None);
        };
        let position = self
            .node(parent)?
            .children
            .iter()
            .position(|&child| child == idx)
            .ok_or(DomainError::StaleHandle)?;
        Ok(Some((parent, position)))
    }

    pub fn find(&self, id: NodeId) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.id == id)
            .map(|(idx, _)| idx)
    }

    /// Looks `id` up and reports a miss as an error.
    pub fn require(&self, id: NodeId) -> TreeResult<Index> {
        self.find(id).ok_or(DomainError::NodeNotFound(id))
    }

    pub fn current(&self) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.is_current)
            .map(|(idx, _)| idx)
    }

    /// Visits the subtree at `idx` once, setting `is_current = (id == target_id)`
    /// on every node. This marks the match and clears any previous current node
    /// in the same pass.
    ///
    /// When `target_id` is absent the subtree is left without a current node.
    #[instrument(level = "debug", skip(self))]
    pub fn set_current_include_child(&mut self, idx: Index, target_id: NodeId) -> TreeResult<Index> {
        self.node(idx)?;
        let mut found = None;
        let mut stack = vec![idx];

        while let Some(current_idx) = stack.pop() {
            if let Some(node) = self.get_node_mut(current_idx) {
                node.is_current = node.id == target_id;
                if node.is_current {
                    found = Some(current_idx);
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }

        found.ok_or_else(|| {
            debug!(target_id, "current node not found in subtree");
            DomainError::NodeNotFound(target_id)
        })
    }

    /// Marks `target_id` current across the whole tree.
    pub fn set_current(&mut self, target_id: NodeId) -> TreeResult<Index> {
        let root = self.root().ok_or(DomainError::EmptyTree)?;
        self.set_current_include_child(root, target_id)
    }
}
