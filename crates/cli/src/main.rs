#![forbid(unsafe_code)]

use nt_core::ids::NodeId;
use nt_storage::{SqliteStore, StoreError};
use std::path::{Path, PathBuf};

const STORAGE_DIR_ENV: &str = "NESTREE_DIR";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Add {
        name: String,
        parent_id: Option<NodeId>,
    },
    Delete {
        id: NodeId,
    },
    Rename {
        id: NodeId,
        name: String,
    },
    Move {
        id: NodeId,
        parent_id: NodeId,
        position: Option<i64>,
    },
    Tree,
}

#[derive(Debug, PartialEq, Eq)]
struct UsageError(String);

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let parsed = split_storage_dir(&args).and_then(|(dir, rest)| {
        let command = parse_command(&rest)?;
        Ok((dir, command))
    });
    let (storage_dir, command) = match parsed {
        Ok(parsed) => parsed,
        Err(UsageError(message)) => {
            eprintln!("{message}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&storage_dir, command) {
        eprintln!("{}", render_error(&err));
        std::process::exit(1);
    }
}

fn run(storage_dir: &Path, command: Command) -> Result<(), StoreError> {
    let mut store = SqliteStore::open(storage_dir)?;
    match command {
        Command::Add { name, parent_id } => {
            let parent_id = parent_id.unwrap_or_else(|| store.root_id());
            let id = store.create(&name, parent_id)?;
            println!("node \"{name}\" has been added with id #{id}");
        }
        Command::Delete { id } => {
            store.delete(id)?;
            println!("node #{id} has been deleted");
        }
        Command::Rename { id, name } => {
            store.rename(id, &name)?;
            println!("node #{id} has been renamed to {name}");
        }
        Command::Move {
            id,
            parent_id,
            position,
        } => {
            store.move_node(id, parent_id, position)?;
            println!("node #{id} has been moved under node #{parent_id}");
        }
        Command::Tree => {
            for row in store.tree()? {
                let indent = "    ".repeat(row.depth.max(0) as usize);
                println!("{indent}{} (#{})", row.name, row.id);
            }
        }
    }
    Ok(())
}

/// `NodeNotFound` and input errors surface as plain messages; anything at
/// the store level is reported generically without internals.
fn render_error(err: &StoreError) -> String {
    match err {
        StoreError::NodeNotFound { .. } | StoreError::InvalidInput(_) | StoreError::RootLocked => {
            err.to_string()
        }
        StoreError::Io(_) | StoreError::Sql(_) | StoreError::Corrupt(_) => {
            "something went wrong, sorry".to_string()
        }
    }
}

fn split_storage_dir(args: &[String]) -> Result<(PathBuf, Vec<String>), UsageError> {
    if args.first().map(String::as_str) == Some("--storage-dir") {
        let Some(dir) = args.get(1) else {
            return Err(UsageError(
                "--storage-dir expects a directory path".to_string(),
            ));
        };
        return Ok((PathBuf::from(dir), args[2..].to_vec()));
    }

    let dir = std::env::var(STORAGE_DIR_ENV)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((dir, args.to_vec()))
}

fn parse_command(args: &[String]) -> Result<Command, UsageError> {
    let Some(command) = args.first() else {
        return Err(UsageError("please provide a command to execute".to_string()));
    };
    let rest = &args[1..];

    let required = match command.as_str() {
        "add" | "delete" => 1,
        "rename" | "move" => 2,
        "tree" => 0,
        other => {
            return Err(UsageError(format!("unknown command: {other}")));
        }
    };
    if rest.len() < required {
        return Err(UsageError(format!(
            "command {command} expects at least {required} argument(s), {} given",
            rest.len()
        )));
    }

    match command.as_str() {
        "add" => Ok(Command::Add {
            name: rest[0].clone(),
            parent_id: rest
                .get(1)
                .map(|raw| parse_node_id(raw, "parent id"))
                .transpose()?,
        }),
        "delete" => Ok(Command::Delete {
            id: parse_node_id(&rest[0], "node id")?,
        }),
        "rename" => Ok(Command::Rename {
            id: parse_node_id(&rest[0], "node id")?,
            name: rest[1].clone(),
        }),
        "move" => Ok(Command::Move {
            id: parse_node_id(&rest[0], "node id")?,
            parent_id: parse_node_id(&rest[1], "parent id")?,
            position: rest
                .get(2)
                .map(|raw| parse_position(raw))
                .transpose()?,
        }),
        "tree" => Ok(Command::Tree),
        _ => unreachable!("command validated above"),
    }
}

fn parse_node_id(raw: &str, what: &str) -> Result<NodeId, UsageError> {
    let value = raw
        .parse::<i64>()
        .map_err(|_| UsageError(format!("{what} must be an integer, got: {raw}")))?;
    NodeId::try_new(value).map_err(|err| UsageError(format!("{what}: {err}")))
}

// Positions are parsed as plain integers: a negative value is a domain
// error the engine rejects before writing, not a usage error.
fn parse_position(raw: &str) -> Result<i64, UsageError> {
    raw.parse::<i64>()
        .map_err(|_| UsageError(format!("position must be an integer, got: {raw}")))
}

fn print_usage() {
    eprintln!("usage: nestree [--storage-dir <dir>] <command> [args]");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  add <name> [parent-id]        add a node (default parent: root)");
    eprintln!("  delete <id>                   delete a node and its subtree");
    eprintln!("  rename <id> <name>            rename a node in place");
    eprintln!("  move <id> <parent-id> [pos]   move a subtree under a new parent");
    eprintln!("  tree                          print the tree, indented by depth");
    eprintln!();
    eprintln!("the database directory comes from --storage-dir, ${STORAGE_DIR_ENV}, or '.'");
}
