#![forbid(unsafe_code)]

use super::{SqliteStore, StoreError, node_id_from_row};
use nt_core::ids::NodeId;
use nt_core::model::Node;
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    /// Resolve a node and its derived parent: the containing interval
    /// with the largest `lft` is the immediate parent.
    pub fn get_by_id(&self, id: NodeId) -> Result<Node, StoreError> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT
                  node.id,
                  node.name,
                  (SELECT parent.id FROM nodes AS parent
                    WHERE parent.lft < node.lft AND parent.rgt > node.rgt
                    ORDER BY parent.lft DESC
                    LIMIT 1) AS parent_id
                FROM nodes AS node
                WHERE node.id = ?1
                "#,
                params![id.as_i64()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((raw_id, name, raw_parent_id)) = row else {
            return Err(StoreError::NodeNotFound { id: id.as_i64() });
        };

        Ok(Node {
            id: node_id_from_row(raw_id)?,
            name,
            parent_id: raw_parent_id.map(node_id_from_row).transpose()?,
        })
    }

    /// Point update of the name; bounds are untouched. A single statement
    /// is already atomic, so no transaction wrapper.
    pub fn rename(&mut self, id: NodeId, name: &str) -> Result<(), StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::InvalidInput("name must not be empty"));
        }
        let updated = self.conn.execute(
            "UPDATE nodes SET name = ?2 WHERE id = ?1",
            params![id.as_i64(), name],
        )?;
        if updated == 0 {
            return Err(StoreError::NodeNotFound { id: id.as_i64() });
        }
        Ok(())
    }
}
