#![forbid(unsafe_code)]

//! The bound store: every read and write here is a declarative predicate
//! over `lft`/`rgt`, never a walk of parent/child references. That is
//! what keeps bulk re-indexing a single pass per statement.

use super::StoreError;
use nt_core::ids::NodeId;
use rusqlite::{OptionalExtension, Transaction, params};

/// Point read of a node's interval. `None` when the id has no row.
pub(super) fn node_bounds_tx(
    tx: &Transaction<'_>,
    id: NodeId,
) -> Result<Option<(i64, i64)>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT lft, rgt FROM nodes WHERE id = ?1",
            params![id.as_i64()],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?)
}

/// `lft = lft + delta` for every row with `lft > threshold`.
pub(super) fn shift_lft_tx(
    tx: &Transaction<'_>,
    threshold: i64,
    delta: i64,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "UPDATE nodes SET lft = lft + ?1 WHERE lft > ?2",
        params![delta, threshold],
    )?)
}

/// `rgt = rgt + delta` for every row with `rgt > threshold`.
pub(super) fn shift_rgt_tx(
    tx: &Transaction<'_>,
    threshold: i64,
    delta: i64,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "UPDATE nodes SET rgt = rgt + ?1 WHERE rgt > ?2",
        params![delta, threshold],
    )?)
}

/// Negate both bounds of every row contained in `[lft, rgt]`. Negative
/// bounds can never collide with attached (positive) ones, so the parked
/// subtree sits outside the ordered space until [`unpark_subtree_tx`]
/// runs in the same transaction.
pub(super) fn park_subtree_tx(tx: &Transaction<'_>, lft: i64, rgt: i64) -> Result<(), StoreError> {
    tx.execute(
        "UPDATE nodes SET lft = -lft, rgt = -rgt WHERE lft >= ?1 AND rgt <= ?2",
        params![lft, rgt],
    )?;
    Ok(())
}

/// Un-park every negative-bound row, translating the whole subtree by a
/// single delta so all relative intervals inside it are preserved.
pub(super) fn unpark_subtree_tx(tx: &Transaction<'_>, shift: i64) -> Result<(), StoreError> {
    tx.execute(
        "UPDATE nodes SET lft = -lft + ?1, rgt = -rgt + ?1 WHERE lft < 0 AND rgt < 0",
        params![shift],
    )?;
    Ok(())
}

/// Delete every row contained in `[lft, rgt]` in one statement.
pub(super) fn delete_subtree_tx(
    tx: &Transaction<'_>,
    lft: i64,
    rgt: i64,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "DELETE FROM nodes WHERE lft >= ?1 AND rgt <= ?2",
        params![lft, rgt],
    )?)
}

pub(super) fn insert_node_tx(
    tx: &Transaction<'_>,
    name: &str,
    lft: i64,
    rgt: i64,
) -> Result<i64, StoreError> {
    tx.execute(
        "INSERT INTO nodes(name, lft, rgt) VALUES (?1, ?2, ?3)",
        params![name, lft, rgt],
    )?;
    Ok(tx.last_insert_rowid())
}

/// `rgt` of the immediate child at 0-based `offset` among the children of
/// `[parent_lft, parent_rgt]` ordered by `lft`, or `None` when the parent
/// has fewer children than that.
///
/// Children are walked edge to edge: the first child starts at
/// `parent_lft + 1` and each next one at the previous child's `rgt + 1`.
/// Deeper descendants are skipped wholesale, so the offset counts
/// children only.
pub(super) fn child_rgt_at_offset_tx(
    tx: &Transaction<'_>,
    parent_lft: i64,
    parent_rgt: i64,
    offset: i64,
) -> Result<Option<i64>, StoreError> {
    let mut child_lft = parent_lft + 1;
    let mut remaining = offset;
    loop {
        if child_lft >= parent_rgt {
            return Ok(None);
        }
        let child_rgt: Option<i64> = tx
            .query_row(
                "SELECT rgt FROM nodes WHERE lft = ?1",
                params![child_lft],
                |row| row.get(0),
            )
            .optional()?;
        let Some(child_rgt) = child_rgt else {
            return Ok(None);
        };
        if remaining == 0 {
            return Ok(Some(child_rgt));
        }
        remaining -= 1;
        child_lft = child_rgt + 1;
    }
}
