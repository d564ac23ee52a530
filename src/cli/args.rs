//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::application::EditCommand;
use crate::domain::NodeId;

/// Inspect and edit outline document trees stored as JSON records
#[derive(Parser, Debug)]
#[command(name = "outliner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Raise log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the document tree
    Show {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print node count, height and next free id
    Stats {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Apply one edit and print the resulting update request
    Edit {
        #[command(flatten)]
        input: InputArgs,

        #[command(subcommand)]
        op: EditOp,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Where the records come from and how they are laid out.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// JSON document: a nested root record, or an array of records with --flat
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Records form a flat list linked by parentId
    #[arg(long)]
    pub flat: bool,

    /// Node to mark current
    #[arg(long)]
    pub current: Option<NodeId>,
}

#[derive(Subcommand, Debug)]
pub enum EditOp {
    /// Swap with the previous sibling
    Up { id: NodeId },
    /// Swap with the next sibling
    Down { id: NodeId },
    /// Promote to a sibling of the parent
    Left { id: NodeId },
    /// Demote into the preceding sibling
    Right { id: NodeId },
    /// Place SOURCE right before TARGET
    Before { source: NodeId, target: NodeId },
    /// Place SOURCE right after TARGET
    After { source: NodeId, target: NodeId },
    /// Make SOURCE the last child of TARGET
    Into { source: NodeId, target: NodeId },
    /// Delete a node with its subtree
    Delete { id: NodeId },
    /// Append a new document under PARENT
    Create {
        parent: NodeId,
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Mark a node current
    Select { id: NodeId },
    /// Change a document title
    Rename { id: NodeId, title: String },
    /// Collapse or expand a node
    Toggle { id: NodeId },
}

impl EditOp {
    pub fn to_command(&self) -> EditCommand {
        match self {
            EditOp::Up { id } => EditCommand::MoveUp(*id),
            EditOp::Down { id } => EditCommand::MoveDown(*id),
            EditOp::Left { id } => EditCommand::MoveLeft(*id),
            EditOp::Right { id } => EditCommand::MoveRight(*id),
            EditOp::Before { source, target } => EditCommand::MoveBefore {
                source: *source,
                target: *target,
            },
            EditOp::After { source, target } => EditCommand::MoveAfter {
                source: *source,
                target: *target,
            },
            EditOp::Into { source, target } => EditCommand::MoveAsChildOf {
                source: *source,
                target: *target,
            },
            EditOp::Delete { id } => EditCommand::Delete(*id),
            EditOp::Create {
                parent,
                title,
                content,
            } => EditCommand::Create {
                parent: *parent,
                title: title.clone(),
                content: content.clone(),
            },
            EditOp::Select { id } => EditCommand::Select(*id),
            EditOp::Rename { id, title } => EditCommand::Rename {
                id: *id,
                title: title.clone(),
            },
            EditOp::Toggle { id } => EditCommand::ToggleExpanded(*id),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show global config file location
    Path,
    /// Print a commented config template
    Template,
}
