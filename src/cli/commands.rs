//! Command dispatch for the inspection binary

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::OutlineSession;
use crate::cli::args::{Cli, Commands, ConfigCommands, EditOp, InputArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{BuiltTree, DomainError, NodeRecord, TreeBuilder};
use crate::tree_traits::TreeNodeConvert;
use crate::util::path::expand_path;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let config_file = cli.config.as_deref().map(expand_path);
    let settings = Settings::load(config_file.as_deref())?;
    debug!(?settings, "effective settings");

    match &cli.command {
        Some(Commands::Show { input }) => show(input, &settings),
        Some(Commands::Stats { input }) => stats(input, &settings),
        Some(Commands::Edit { input, op }) => edit(input, op, &settings),
        Some(Commands::Config { command }) => config(command, &settings),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::InvalidArgs("no command given, see --help".into())),
    }
}

/// Records as read from the input file.
enum Records {
    Nested(NodeRecord),
    Flat(Vec<NodeRecord>),
}

fn read_records(input: &InputArgs) -> CliResult<Records> {
    let path = expand_path(&input.file);
    let content = std::fs::read_to_string(&path).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    let json_err = |source: serde_json::Error| CliError::Json {
        path: path.clone(),
        source,
    };
    if input.flat {
        serde_json::from_str(&content).map(Records::Flat).map_err(json_err)
    } else {
        serde_json::from_str(&content).map(Records::Nested).map_err(json_err)
    }
}

/// Every tree in the input, with the current node marked where requested.
fn build_trees(input: &InputArgs, settings: &Settings) -> CliResult<Vec<BuiltTree>> {
    let builder = TreeBuilder::new().with_root_fallback(settings.root_fallback);
    match read_records(input)? {
        Records::Nested(root) => {
            let built = match input.current {
                Some(id) => builder.build_with_current(&root, id)?,
                None => builder.build(&root)?,
            };
            Ok(vec![built])
        }
        Records::Flat(records) => {
            let mut trees = builder.build_from_flat(&records)?;
            if let Some(id) = input.current {
                let (tree, _) = trees
                    .iter_mut()
                    .find(|(tree, _)| tree.find(id).is_some())
                    .ok_or(DomainError::NodeNotFound(id))?;
                tree.set_current(id)?;
            }
            Ok(trees)
        }
    }
}

fn open_session(input: &InputArgs, settings: &Settings) -> CliResult<OutlineSession> {
    let session = match read_records(input)? {
        Records::Nested(root) => OutlineSession::open(&root, input.current, settings)?,
        Records::Flat(records) => OutlineSession::open_flat(&records, input.current, settings)?,
    };
    Ok(session)
}

#[instrument(skip(settings))]
fn show(input: &InputArgs, settings: &Settings) -> CliResult<()> {
    for (tree, _) in build_trees(input, settings)? {
        output::info(&tree.to_tree_string());
    }
    Ok(())
}

#[instrument(skip(settings))]
fn stats(input: &InputArgs, settings: &Settings) -> CliResult<()> {
    for (tree, count) in build_trees(input, settings)? {
        let Some(root) = tree.root() else {
            continue;
        };
        let root_node = tree.node(root)?;
        output::header(&format!("{} [{}]", root_node.data.title, root_node.id));
        output::field("nodes", &count);
        output::field("height", &tree.height());
        output::field("leaves", &tree.leaf_nodes().len());
        output::field("next id", &tree.unique_id(root)?);
        if let Some(current) = tree.current() {
            let path = tree
                .ancestors(current)?
                .into_iter()
                .rev()
                .chain(std::iter::once(current))
                .filter_map(|idx| tree.get_node(idx))
                .map(|node| node.data.title.as_str())
                .join(" > ");
            output::field("current", &path);
            output::field("depth", &tree.depth(current)?);
        }
    }
    Ok(())
}

#[instrument(skip(settings))]
fn edit(input: &InputArgs, op: &EditOp, settings: &Settings) -> CliResult<()> {
    let mut session = open_session(input, settings)?;
    let command = op.to_command();

    if !session.apply(&command)? {
        return Err(CliError::Rejected(format!("{command:?}")));
    }

    let update = session.flush()?;
    output::info(&session.tree().to_tree_string());
    output::info(&serde_json::to_string_pretty(&update).map_err(CliError::Encode)?);
    Ok(())
}

fn config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => {
            let path = global_config_path().unwrap_or_else(|| PathBuf::from("<none>"));
            let status = if path.exists() {
                "exists"
            } else {
                "not found"
            };
            output::info(&format!("{} ({status})", path.display()));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
