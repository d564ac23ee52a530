//! Flattened update payloads for the persistence layer.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::arena::{TreeArena, TreeNode};
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::node::{Document, GroupId, NodeId};

/// One node row as it should be committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    pub id: NodeId,
    pub title: String,
    pub content: String,
    pub group_id: GroupId,
    pub parent_id: Option<NodeId>,
    /// Position among siblings
    pub order: usize,
    pub is_public: bool,
}

/// Batched snapshot committed in one transaction.
///
/// With `has_structural_changes == false` only content columns changed and
/// parent/order columns need no rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeUpdateRequest {
    pub root_id: NodeId,
    pub has_structural_changes: bool,
    pub nodes: Vec<NodeUpdate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_ids: Vec<NodeId>,
}

impl TreeUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.removed_ids.is_empty()
    }
}

impl TreeArena<Document> {
    /// Full pre-order flattening of the tree, marked structural.
    #[instrument(level = "debug", skip(self))]
    pub fn snapshot(&self) -> TreeResult<TreeUpdateRequest> {
        Ok(TreeUpdateRequest {
            root_id: self.root_id()?,
            has_structural_changes: true,
            nodes: self.flatten(|_| true)?,
            removed_ids: self.changes().removed.clone(),
        })
    }

    /// Everything recorded since the last flush.
    ///
    /// After a structural edit the whole tree is emitted, since parent/order
    /// columns of untouched nodes may have shifted. Otherwise only the touched
    /// nodes are.
    #[instrument(level = "debug", skip(self))]
    pub fn pending_update(&self) -> TreeResult<TreeUpdateRequest> {
        let changes = self.changes();
        if changes.structural {
            return self.snapshot();
        }
        Ok(TreeUpdateRequest {
            root_id: self.root_id()?,
            has_structural_changes: false,
            nodes: self.flatten(|node| changes.touched.contains(&node.id))?,
            removed_ids: Vec::new(),
        })
    }

    /// [`pending_update`](Self::pending_update), then forget the recorded changes.
    pub fn take_update(&mut self) -> TreeResult<TreeUpdateRequest> {
        let update = self.pending_update()?;
        self.clear_changes();
        Ok(update)
    }

    fn root_id(&self) -> TreeResult<NodeId> {
        let root = self.root().ok_or(DomainError::EmptyTree)?;
        Ok(self.node(root)?.id)
    }

    fn flatten<P>(&self, include: P) -> TreeResult<Vec<NodeUpdate>>
    where
        P: Fn(&TreeNode<Document>) -> bool,
    {
        let mut rows = Vec::new();
        for (idx, node) in self.iter() {
            if !include(node) {
                continue;
            }
            let (parent_id, order) = match self.sibling_position(idx)? {
                Some((parent, position)) => (Some(self.node(parent)?.id), position),
                None => (None, 0),
            };
            rows.push(NodeUpdate {
                id: node.id,
                title: node.data.title.clone(),
                content: node.data.content.clone(),
                group_id: node.data.group_id,
                parent_id,
                order,
                is_public: node.data.is_public,
            });
        }
        Ok(rows)
    }
}
