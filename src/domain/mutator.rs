//! Structural edits on a tree already held in an arena.
//!
//! Every edit either applies completely or is rejected with a [`MoveError`]
//! and leaves the tree untouched.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::TreeArena;
use crate::domain::error::{MoveError, MoveResult, TreeResult};
use crate::domain::node::NodeId;

/// Which side of the target a node is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

impl<T> TreeArena<T> {
    /// Parent and sibling position, or the rejection for a root/unknown node.
    fn locate(&self, idx: Index) -> Result<(Index, usize), MoveError> {
        match self.sibling_position(idx) {
            Ok(Some(location)) => Ok(location),
            Ok(None) => Err(MoveError::IsRoot),
            Err(_) => Err(MoveError::UnknownNode),
        }
    }

    fn children_mut(&mut self, idx: Index) -> Result<&mut Vec<Index>, MoveError> {
        self.get_node_mut(idx)
            .map(|node| &mut node.children)
            .ok_or(MoveError::UnknownNode)
    }

    fn set_parent(&mut self, idx: Index, parent: Index) -> MoveResult {
        let node = self.get_node_mut(idx).ok_or(MoveError::UnknownNode)?;
        node.parent = Some(parent);
        Ok(())
    }

    fn swap_with_sibling(&mut self, idx: Index, offset: isize) -> MoveResult {
        let (parent, position) = self.locate(idx)?;
        let children = self.children_mut(parent)?;
        let other = position
            .checked_add_signed(offset)
            .filter(|&other| other < children.len())
            .ok_or(MoveError::AtBoundary)?;
        children.swap(position, other);
        self.changes_mut().mark_structural();
        Ok(())
    }

    /// Swaps `idx` with its previous sibling.
    #[instrument(level = "debug", skip(self))]
    pub fn move_up(&mut self, idx: Index) -> MoveResult {
        self.swap_with_sibling(idx, -1)
            .inspect_err(|e| debug!(%e, "move up rejected"))
    }

    /// Swaps `idx` with its next sibling.
    #[instrument(level = "debug", skip(self))]
    pub fn move_down(&mut self, idx: Index) -> MoveResult {
        self.swap_with_sibling(idx, 1)
            .inspect_err(|e| debug!(%e, "move down rejected"))
    }

    /// Promotes `idx` to a sibling of its parent, placed right after the former parent.
    #[instrument(level = "debug", skip(self))]
    pub fn move_left(&mut self, idx: Index) -> MoveResult {
        let (parent, position) = self.locate(idx)?;
        let (grandparent, parent_position) = self.locate(parent).map_err(|e| match e {
            MoveError::IsRoot => MoveError::NoGrandparent,
            other => other,
        })?;

        self.children_mut(parent)?.remove(position);
        self.children_mut(grandparent)?
            .insert(parent_position + 1, idx);
        self.set_parent(idx, grandparent)?;
        self.changes_mut().mark_structural();
        Ok(())
    }

    /// Demotes `idx` to the last child of its preceding sibling.
    #[instrument(level = "debug", skip(self))]
    pub fn move_right(&mut self, idx: Index) -> MoveResult {
        let (parent, position) = self.locate(idx)?;
        if position == 0 {
            return Err(MoveError::NoPrecedingSibling);
        }

        let children = self.children_mut(parent)?;
        let new_parent = children[position - 1];
        children.remove(position);
        self.children_mut(new_parent)?.push(idx);
        self.set_parent(idx, new_parent)?;
        self.changes_mut().mark_structural();
        Ok(())
    }

    /// Places `source` immediately before `target`.
    pub fn move_before(&mut self, source: Index, target: Index) -> MoveResult {
        self.move_beside(source, target, Placement::Before)
    }

    /// Places `source` immediately after `target`.
    pub fn move_after(&mut self, source: Index, target: Index) -> MoveResult {
        self.move_beside(source, target, Placement::After)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn move_beside(&mut self, source: Index, target: Index, placement: Placement) -> MoveResult {
        if source == target {
            return Err(MoveError::SameNode);
        }
        let (target_parent, target_position) = self.locate(target).map_err(|e| match e {
            MoveError::IsRoot => MoveError::TargetIsRoot,
            other => other,
        })?;
        if self
            .is_in_subtree(target_parent, source)
            .map_err(|_| MoveError::UnknownNode)?
        {
            return Err(MoveError::WouldCreateCycle);
        }
        let (source_parent, source_position) = self.locate(source)?;

        if source_parent == target_parent {
            let already_placed = match placement {
                Placement::Before => source_position + 1 == target_position,
                Placement::After => target_position + 1 == source_position,
            };
            if already_placed {
                return Ok(());
            }
            let children = self.children_mut(target_parent)?;
            children.remove(source_position);
            // Removing an earlier sibling shifts the target down by one
            let shifted = if source_position < target_position {
                target_position - 1
            } else {
                target_position
            };
            let insert_at = match placement {
                Placement::Before => shifted,
                Placement::After => shifted + 1,
            };
            children.insert(insert_at, source);
        } else {
            self.children_mut(source_parent)?.remove(source_position);
            let insert_at = match placement {
                Placement::Before => target_position,
                Placement::After => target_position + 1,
            };
            self.children_mut(target_parent)?.insert(insert_at, source);
            self.set_parent(source, target_parent)?;
        }

        self.changes_mut().mark_structural();
        Ok(())
    }

    /// Detaches `source` and appends it as the last child of `target`.
    #[instrument(level = "debug", skip(self))]
    pub fn move_as_child_of(&mut self, source: Index, target: Index) -> MoveResult {
        if source == target {
            return Err(MoveError::SameNode);
        }
        if !self.contains(source) {
            return Err(MoveError::UnknownNode);
        }
        if self
            .is_in_subtree(target, source)
            .map_err(|_| MoveError::UnknownNode)?
        {
            return Err(MoveError::WouldCreateCycle);
        }
        let (source_parent, source_position) = self.locate(source)?;

        self.children_mut(source_parent)?.remove(source_position);
        self.children_mut(target)?.push(source);
        self.set_parent(source, target)?;
        self.changes_mut().mark_structural();
        Ok(())
    }

    /// Releases every descendant of `idx`, then detaches `idx` from its parent
    /// and releases it too.
    ///
    /// Returns the parent's id, or None when `idx` is the root. The root itself
    /// is kept so the tree still has exactly one root; only its descendants go.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_include_child(&mut self, idx: Index) -> TreeResult<Option<NodeId>> {
        let parent = self.node(idx)?.parent;
        let descendants: Vec<Index> = self
            .iter_postorder(idx)
            .map(|(child, _)| child)
            .filter(|&child| child != idx)
            .collect();

        for child in descendants {
            self.release(child);
        }
        self.node_mut(idx)?.children.clear();

        let Some(parent) = parent else {
            self.changes_mut().mark_structural();
            debug!("cleared descendants of root");
            return Ok(None);
        };

        let parent_node = self.node_mut(parent)?;
        parent_node.children.retain(|&child| child != idx);
        let parent_id = parent_node.id;
        self.release(idx);
        Ok(Some(parent_id))
    }

    fn release(&mut self, idx: Index) {
        if let Some(node) = self.remove_node(idx) {
            self.changes_mut().record_removed(node.id);
        }
    }

    /// Appends a new leaf under `parent` with a freshly allocated id.
    #[instrument(level = "debug", skip(self, data))]
    pub fn create_child(&mut self, parent: Index, data: T) -> TreeResult<(Index, NodeId)> {
        let id = self.unique_id(parent)?;
        let idx = self.insert_node(id, data, Some(parent));
        let changes = self.changes_mut();
        changes.mark_structural();
        changes.touch(id);
        Ok((idx, id))
    }

    /// Applies a content-only edit to the payload of `idx`.
    pub fn update_data<F>(&mut self, idx: Index, edit: F) -> TreeResult<()>
    where
        F: FnOnce(&mut T),
    {
        let node = self.node_mut(idx)?;
        edit(&mut node.data);
        let id = node.id;
        self.changes_mut().touch(id);
        Ok(())
    }

    pub fn set_expanded(&mut self, idx: Index, expanded: bool) -> TreeResult<()> {
        self.node_mut(idx)?.is_expanded = expanded;
        Ok(())
    }

    pub fn toggle_expanded(&mut self, idx: Index) -> TreeResult<bool> {
        let node = self.node_mut(idx)?;
        node.is_expanded = !node.is_expanded;
        Ok(node.is_expanded)
    }
}
