#![forbid(unsafe_code)]

use super::{SqliteStore, StoreError, node_id_from_row};
use nt_core::model::TreeRow;

impl SqliteStore {
    /// Depth projection of the whole tree ordered by `lft`: depth is the
    /// count of containing intervals (including the node's own) minus
    /// one. Every call re-queries the committed snapshot, so the sequence
    /// is finite and restartable.
    ///
    /// Purely derivative of the bounds; this is also the cheapest oracle
    /// for the nesting invariants, since depth must grow by exactly one
    /// per level with no gaps.
    pub fn tree(&self) -> Result<Vec<TreeRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT node.id, node.name, COUNT(parent.id) - 1 AS depth
            FROM nodes AS node, nodes AS parent
            WHERE node.lft BETWEEN parent.lft AND parent.rgt
            GROUP BY node.id
            ORDER BY node.lft
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (raw_id, name, depth) = row?;
            out.push(TreeRow {
                id: node_id_from_row(raw_id)?,
                name,
                depth,
            });
        }
        Ok(out)
    }
}
