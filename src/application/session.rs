//! One open document: a tree plus the edits applied to it since the last flush.

use generational_arena::Index;
use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{
    Document, DomainError, GroupId, MoveResult, NodeId, NodeRecord, TreeArena, TreeBuilder,
    TreeUpdateRequest,
};

/// An edit addressed by node id, as issued by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    MoveUp(NodeId),
    MoveDown(NodeId),
    MoveLeft(NodeId),
    MoveRight(NodeId),
    MoveBefore { source: NodeId, target: NodeId },
    MoveAfter { source: NodeId, target: NodeId },
    MoveAsChildOf { source: NodeId, target: NodeId },
    Delete(NodeId),
    Create {
        parent: NodeId,
        title: String,
        content: String,
    },
    Select(NodeId),
    Rename { id: NodeId, title: String },
    SetContent { id: NodeId, content: String },
    ToggleExpanded(NodeId),
}

/// Single-owner editing session over one document tree.
#[derive(Debug)]
pub struct OutlineSession {
    tree: TreeArena<Document>,
    group_id: GroupId,
    settings: Settings,
}

impl OutlineSession {
    /// Opens a session from a nested root record.
    #[instrument(level = "debug", skip(root, settings), fields(root_id = root.id))]
    pub fn open(
        root: &NodeRecord,
        current: Option<NodeId>,
        settings: &Settings,
    ) -> ApplicationResult<Self> {
        let builder = TreeBuilder::new().with_root_fallback(settings.root_fallback);
        let (tree, count) = match current {
            Some(id) => builder.build_with_current(root, id)?,
            None => builder.build(root)?,
        };
        info!(count, "opened document");
        Ok(Self::from_tree(tree, settings))
    }

    /// Opens a session from a flat record list.
    ///
    /// The list may hold several trees of a group; the one containing
    /// `current` is opened, or the first one when `current` is None.
    #[instrument(level = "debug", skip(records, settings), fields(records = records.len()))]
    pub fn open_flat(
        records: &[NodeRecord],
        current: Option<NodeId>,
        settings: &Settings,
    ) -> ApplicationResult<Self> {
        let builder = TreeBuilder::new().with_root_fallback(settings.root_fallback);
        let mut trees = builder.build_from_flat(records)?;

        let position = match current {
            Some(id) => trees
                .iter()
                .position(|(tree, _)| tree.find(id).is_some())
                .ok_or(DomainError::NodeNotFound(id))?,
            None => 0,
        };
        let (mut tree, count) = trees.swap_remove(position);
        if let Some(id) = current {
            tree.set_current(id)?;
        }
        info!(count, "opened document");
        Ok(Self::from_tree(tree, settings))
    }

    fn from_tree(tree: TreeArena<Document>, settings: &Settings) -> Self {
        let group_id = tree
            .root()
            .and_then(|root| tree.get_node(root))
            .map(|node| node.data.group_id)
            .unwrap_or_default();
        Self {
            tree,
            group_id,
            settings: settings.clone(),
        }
    }

    pub fn tree(&self) -> &TreeArena<Document> {
        &self.tree
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn current_id(&self) -> Option<NodeId> {
        self.tree
            .current()
            .and_then(|idx| self.tree.get_node(idx))
            .map(|node| node.id)
    }

    fn index_of(&self, id: NodeId) -> ApplicationResult<Index> {
        Ok(self.tree.require(id)?)
    }

    /// Applies one edit.
    ///
    /// Returns `Ok(false)` when a structural edit is rejected; the tree is then
    /// unchanged. Unknown ids are errors.
    #[instrument(level = "debug", skip(self))]
    pub fn apply(&mut self, command: &EditCommand) -> ApplicationResult<bool> {
        let outcome = match command {
            EditCommand::MoveUp(id) => {
                let idx = self.index_of(*id)?;
                self.tree.move_up(idx)
            }
            EditCommand::MoveDown(id) => {
                let idx = self.index_of(*id)?;
                self.tree.move_down(idx)
            }
            EditCommand::MoveLeft(id) => {
                let idx = self.index_of(*id)?;
                self.tree.move_left(idx)
            }
            EditCommand::MoveRight(id) => {
                let idx = self.index_of(*id)?;
                self.tree.move_right(idx)
            }
            EditCommand::MoveBefore { source, target } => {
                let (source, target) = (self.index_of(*source)?, self.index_of(*target)?);
                self.tree.move_before(source, target)
            }
            EditCommand::MoveAfter { source, target } => {
                let (source, target) = (self.index_of(*source)?, self.index_of(*target)?);
                self.tree.move_after(source, target)
            }
            EditCommand::MoveAsChildOf { source, target } => {
                let (source, target) = (self.index_of(*source)?, self.index_of(*target)?);
                self.tree.move_as_child_of(source, target)
            }
            EditCommand::Delete(id) => {
                self.delete(*id)?;
                Ok(())
            }
            EditCommand::Create {
                parent,
                title,
                content,
            } => {
                self.create(*parent, title, content)?;
                Ok(())
            }
            EditCommand::Select(id) => {
                // Resolve first: a miss must not clear the existing selection
                self.index_of(*id)?;
                self.tree.set_current(*id)?;
                Ok(())
            }
            EditCommand::Rename { id, title } => {
                let idx = self.index_of(*id)?;
                self.tree.update_data(idx, |doc| doc.title = title.clone())?;
                Ok(())
            }
            EditCommand::SetContent { id, content } => {
                let idx = self.index_of(*id)?;
                self.tree
                    .update_data(idx, |doc| doc.content = content.clone())?;
                Ok(())
            }
            EditCommand::ToggleExpanded(id) => {
                let idx = self.index_of(*id)?;
                self.tree.toggle_expanded(idx)?;
                Ok(())
            }
        };
        Ok(accepted(outcome))
    }

    /// Appends a new document under `parent` and returns its id.
    pub fn create(&mut self, parent: NodeId, title: &str, content: &str) -> ApplicationResult<NodeId> {
        let parent_idx = self.index_of(parent)?;
        let document = Document::new(title, self.group_id).with_content(content);
        let (idx, id) = self.tree.create_child(parent_idx, document)?;
        self.tree.set_expanded(idx, self.settings.expand_new_nodes)?;
        debug!(id, parent, "created document");
        Ok(id)
    }

    /// Deletes `id` with its subtree and returns the parent id (None for the root).
    ///
    /// When the current node goes with it, the parent becomes current if the
    /// settings ask for that.
    pub fn delete(&mut self, id: NodeId) -> ApplicationResult<Option<NodeId>> {
        let idx = self.index_of(id)?;
        let current_removed = match self.tree.current() {
            Some(current) => self.tree.is_in_subtree(current, idx)?,
            None => false,
        };

        let parent_id = self.tree.delete_include_child(idx)?;

        if current_removed && self.settings.select_parent_on_delete {
            // Deleting the root keeps the root itself, so it takes over
            self.tree.set_current(parent_id.unwrap_or(id))?;
        }
        Ok(parent_id)
    }

    /// Everything changed since the last flush, without forgetting it.
    pub fn pending(&self) -> ApplicationResult<TreeUpdateRequest> {
        Ok(self.tree.pending_update()?)
    }

    /// Collects the batched update and starts a new batch.
    #[instrument(level = "debug", skip(self))]
    pub fn flush(&mut self) -> ApplicationResult<TreeUpdateRequest> {
        let update = self.tree.take_update()?;
        debug!(
            nodes = update.nodes.len(),
            structural = update.has_structural_changes,
            "flushed"
        );
        Ok(update)
    }
}

fn accepted(outcome: MoveResult) -> bool {
    match outcome {
        Ok(()) => true,
        Err(e) => {
            debug!(%e, "edit rejected");
            false
        }
    }
}
