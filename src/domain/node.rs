//! Outline payload and persisted record types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Node identifier, unique within one tree.
pub type NodeId = i64;

/// Workspace grouping key.
pub type GroupId = i64;

/// Payload carried by every outline node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub content: String,
    pub group_id: GroupId,
    pub is_public: bool,
}

impl Document {
    pub fn new(title: impl Into<String>, group_id: GroupId) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            group_id,
            is_public: false,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// A node as handed over by the persistence layer.
///
/// Records arrive either nested (the root record with its `children`) or as a
/// flat list where only `parent_id` and `order` describe the hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub group_id: GroupId,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    pub fn new(id: NodeId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Appends `child` to the nested children, pointing its parent reference here.
    pub fn with_child(mut self, mut child: NodeRecord) -> Self {
        child.parent_id = Some(self.id);
        child.order = self.children.len() as i32;
        self.children.push(child);
        self
    }

    pub fn document(&self) -> Document {
        Document {
            title: self.title.clone(),
            content: self.content.clone(),
            group_id: self.group_id,
            is_public: self.is_public,
        }
    }
}
