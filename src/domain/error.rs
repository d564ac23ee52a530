//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent precondition violations.
/// A caller that hits one of these has handed the tree bad data or a bad id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("no records to build a tree from")]
    EmptyInput,

    #[error("no unparented record found among {count} records")]
    NoRoot { count: usize },

    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("cycle detected in hierarchy at node: {0}")]
    CycleDetected(NodeId),

    #[error("record {id} references parent {parent_id} which is not reachable from any root")]
    OrphanRecord { id: NodeId, parent_id: NodeId },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("stale node handle")]
    StaleHandle,

    #[error("tree has no root")]
    EmptyTree,

    #[error("no id left above {0}")]
    IdSpaceExhausted(NodeId),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Expected rejections of a structural edit.
///
/// None of these mutate the tree. Callers branch on them, e.g. to disable
/// a "move up" control.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("node is the root")]
    IsRoot,

    #[error("node is already at the sibling boundary")]
    AtBoundary,

    #[error("node has no grandparent")]
    NoGrandparent,

    #[error("node has no preceding sibling")]
    NoPrecedingSibling,

    #[error("source and target are the same node")]
    SameNode,

    #[error("cannot position a node relative to the root")]
    TargetIsRoot,

    #[error("target lies inside the source subtree")]
    WouldCreateCycle,

    #[error("unknown node handle")]
    UnknownNode,
}

/// Result type for structural edits.
pub type MoveResult = Result<(), MoveError>;
