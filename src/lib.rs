//! Outline document core.
//!
//! Documents form a hierarchy per workspace group. This crate holds one
//! hierarchy in an arena-backed tree and implements everything structural on
//! it: building from persisted records, id allocation, depth and count
//! queries, current-node tracking, and move/reparent/delete edits. Changes
//! leave as a batched [`TreeUpdateRequest`](domain::TreeUpdateRequest) for the
//! persistence layer to commit.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, EditCommand, OutlineSession};
pub use config::Settings;
pub use domain::{
    Document, DomainError, MoveError, NodeId, NodeRecord, RootFallback, TreeArena, TreeBuilder,
    TreeUpdateRequest,
};
