//! Domain layer: the document tree and its algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod error;
pub mod mutator;
pub mod node;
pub mod query;
pub mod update;

pub use arena::{ChangeSet, TreeArena, TreeNode};
pub use builder::{BuiltTree, RootFallback, TreeBuilder};
pub use error::{DomainError, MoveError, MoveResult, TreeResult};
pub use mutator::Placement;
pub use node::{Document, GroupId, NodeId, NodeRecord};
pub use update::{NodeUpdate, TreeUpdateRequest};
