//! Tree builder converting persisted records into arena trees.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::arena::TreeArena;
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::node::{Document, NodeId, NodeRecord};

/// A freshly built tree and the number of nodes it holds.
pub type BuiltTree = (TreeArena<Document>, usize);

/// What to do when no record is free of a parent reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootFallback {
    /// Fail with [`DomainError::NoRoot`].
    #[default]
    Strict,
    /// Warn and treat the first record as the root.
    FirstRecord,
}

/// Constructs document trees from persisted records.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    root_fallback: RootFallback,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_fallback(mut self, root_fallback: RootFallback) -> Self {
        self.root_fallback = root_fallback;
        self
    }

    /// Build from a root record and its nested children.
    #[instrument(level = "debug", skip(self, root), fields(root_id = root.id))]
    pub fn build(&self, root: &NodeRecord) -> TreeResult<BuiltTree> {
        self.build_nested(root, None)
    }

    /// Build from nested records and mark `current_id` current in the same pass.
    #[instrument(level = "debug", skip(self, root), fields(root_id = root.id))]
    pub fn build_with_current(&self, root: &NodeRecord, current_id: NodeId) -> TreeResult<BuiltTree> {
        self.build_nested(root, Some(current_id))
    }

    fn build_nested(&self, root: &NodeRecord, current_id: Option<NodeId>) -> TreeResult<BuiltTree> {
        if let Some(parent_id) = root.parent_id {
            self.accept_parented_root(root, parent_id, 1)?;
        }

        let mut tree = TreeArena::new();
        let mut visited = HashSet::new();
        let (count, current) = grow(
            &mut tree,
            root,
            &mut visited,
            current_id,
            DomainError::DuplicateId,
            |record| record.children.iter().collect(),
        )?;

        if let Some(target) = current_id {
            if current.is_none() {
                return Err(DomainError::NodeNotFound(target));
            }
        }
        debug!(count, "built tree");
        Ok((tree, count))
    }

    /// Build every tree contained in a flat record list.
    ///
    /// Hierarchy comes from `parent_id` only; siblings are ordered by `order`,
    /// ties keep input order. Nested `children` are ignored here.
    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn build_from_flat(&self, records: &[NodeRecord]) -> TreeResult<Vec<BuiltTree>> {
        let first = records.first().ok_or(DomainError::EmptyInput)?;

        let mut by_id: HashMap<NodeId, &NodeRecord> = HashMap::with_capacity(records.len());
        let mut children_of: HashMap<NodeId, Vec<&NodeRecord>> = HashMap::new();
        for record in records {
            if by_id.insert(record.id, record).is_some() {
                return Err(DomainError::DuplicateId(record.id));
            }
            if let Some(parent_id) = record.parent_id {
                children_of.entry(parent_id).or_default().push(record);
            }
        }
        for siblings in children_of.values_mut() {
            siblings.sort_by_key(|record| record.order);
        }

        let mut roots: Vec<&NodeRecord> = records
            .iter()
            .filter(|record| record.parent_id.is_none())
            .collect();
        if roots.is_empty() {
            if let Some(parent_id) = first.parent_id {
                self.accept_parented_root(first, parent_id, records.len())?;
            }
            roots.push(first);
        }

        let mut visited = HashSet::new();
        let mut trees = Vec::with_capacity(roots.len());
        for root in roots {
            let mut tree = TreeArena::new();
            // Ids are unique here, so reaching a record twice means its parent chain loops
            let (count, _) = grow(
                &mut tree,
                root,
                &mut visited,
                None,
                DomainError::CycleDetected,
                |record| children_of.get(&record.id).cloned().unwrap_or_default(),
            )?;
            trees.push((tree, count));
        }

        if let Some(stray) = records.iter().find(|record| !visited.contains(&record.id)) {
            return Err(classify_unreachable(stray, &by_id));
        }

        debug!(trees = trees.len(), "built trees from flat records");
        Ok(trees)
    }

    fn accept_parented_root(&self, record: &NodeRecord, parent_id: NodeId, count: usize) -> TreeResult<()> {
        match self.root_fallback {
            RootFallback::Strict => Err(DomainError::NoRoot { count }),
            RootFallback::FirstRecord => {
                warn!(
                    id = record.id,
                    parent_id, "no unparented record, treating first record as root"
                );
                Ok(())
            }
        }
    }
}

/// Depth-first insert of `root` and everything below it, preserving child order.
/// Returns the number of nodes inserted and the handle marked current, if any.
fn grow<'r, F>(
    tree: &mut TreeArena<Document>,
    root: &'r NodeRecord,
    visited: &mut HashSet<NodeId>,
    current_id: Option<NodeId>,
    revisited: fn(NodeId) -> DomainError,
    children: F,
) -> TreeResult<(usize, Option<Index>)>
where
    F: Fn(&'r NodeRecord) -> Vec<&'r NodeRecord>,
{
    let mut count = 0;
    let mut current = None;
    let mut stack: Vec<(&NodeRecord, Option<Index>)> = vec![(root, None)];

    while let Some((record, parent_idx)) = stack.pop() {
        if !visited.insert(record.id) {
            return Err(revisited(record.id));
        }

        let idx = tree.insert_node(record.id, record.document(), parent_idx);
        count += 1;
        if current_id == Some(record.id) {
            if let Some(node) = tree.get_node_mut(idx) {
                node.is_current = true;
            }
            current = Some(idx);
        }

        // Reverse so the first child is popped, and therefore inserted, first
        for child in children(record).into_iter().rev() {
            stack.push((child, Some(idx)));
        }
    }

    Ok((count, current))
}

/// Explains why `record` was not reached from any root.
fn classify_unreachable<'a>(
    record: &'a NodeRecord,
    by_id: &HashMap<NodeId, &'a NodeRecord>,
) -> DomainError {
    let mut seen = HashSet::new();
    let mut current = record;
    while let Some(parent_id) = current.parent_id {
        if !seen.insert(current.id) {
            return DomainError::CycleDetected(current.id);
        }
        match by_id.get(&parent_id) {
            Some(&parent) => current = parent,
            None => {
                return DomainError::OrphanRecord {
                    id: current.id,
                    parent_id,
                }
            }
        }
    }
    // Chain ends at an unparented record, which is always a root
    DomainError::CycleDetected(record.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(id: NodeId, parent_id: Option<NodeId>, order: i32) -> NodeRecord {
        NodeRecord {
            parent_id,
            order,
            ..NodeRecord::new(id, format!("n{id}"))
        }
    }

    #[test]
    fn given_nested_records_when_building_then_counts_every_node() {
        let root = NodeRecord::new(1, "root")
            .with_child(NodeRecord::new(2, "a"))
            .with_child(NodeRecord::new(3, "b").with_child(NodeRecord::new(4, "c")));

        let (tree, count) = TreeBuilder::new().build(&root).unwrap();

        assert_eq!(count, 4);
        assert_eq!(tree.len(), 4);
        let ids: Vec<NodeId> = tree.iter().map(|(_, n)| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn given_flat_records_out_of_order_when_building_then_sorts_siblings_by_order() {
        let records = vec![
            flat(3, Some(1), 1),
            flat(1, None, 0),
            flat(2, Some(1), 0),
        ];

        let trees = TreeBuilder::new().build_from_flat(&records).unwrap();

        assert_eq!(trees.len(), 1);
        let ids: Vec<NodeId> = trees[0].0.iter().map(|(_, n)| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn given_two_node_cycle_when_classifying_then_reports_cycle() {
        let a = flat(1, Some(2), 0);
        let b = flat(2, Some(1), 0);
        let by_id: HashMap<NodeId, &NodeRecord> = [(1, &a), (2, &b)].into_iter().collect();

        assert!(matches!(
            classify_unreachable(&a, &by_id),
            DomainError::CycleDetected(_)
        ));
    }
}
