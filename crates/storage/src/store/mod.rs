#![forbid(unsafe_code)]

mod bounds;
mod create;
mod delete;
mod error;
mod moves;
mod nodes;
mod tree;

pub use error::StoreError;

use nt_core::ids::NodeId;
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE: &str = "nestree.db";
const ROOT_ID: i64 = 1;
const ROOT_NAME: &str = "root";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
    root: NodeId,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        install_schema(&conn)?;

        let root = node_id_from_row(ROOT_ID)?;
        Ok(Self {
            conn,
            storage_dir,
            root,
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// The root sentinel seeded at bootstrap. Callers address the top of
    /// the tree through this accessor instead of re-deriving the minimal
    /// bound; the engine refuses to move or delete it.
    pub fn root_id(&self) -> NodeId {
        self.root
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS nodes (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          lft INTEGER NOT NULL,
          rgt INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_nodes_lft ON nodes(lft);
        CREATE INDEX IF NOT EXISTS idx_nodes_rgt ON nodes(rgt);
        "#,
    )?;

    // Seed the single root row only when the table is empty so a reopen
    // never reseeds over live data.
    conn.execute(
        r#"
        INSERT INTO nodes(id, name, lft, rgt)
        SELECT ?1, ?2, 1, 2
        WHERE NOT EXISTS (SELECT 1 FROM nodes)
        "#,
        params![ROOT_ID, ROOT_NAME],
    )?;
    Ok(())
}

fn node_id_from_row(raw: i64) -> Result<NodeId, StoreError> {
    NodeId::try_new(raw).map_err(|_| StoreError::Corrupt("non-positive id in nodes table"))
}
