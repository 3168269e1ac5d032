#![forbid(unsafe_code)]

use super::bounds::{
    child_rgt_at_offset_tx, node_bounds_tx, park_subtree_tx, shift_lft_tx, shift_rgt_tx,
    unpark_subtree_tx,
};
use super::{SqliteStore, StoreError};
use nt_core::ids::NodeId;
use rusqlite::TransactionBehavior;

impl SqliteStore {
    /// Relocate a subtree under `new_parent_id`.
    ///
    /// Detach / compact / reattach, in that order, inside one exclusive
    /// transaction. The detached subtree is parked with negated bounds so
    /// the rest of the table never holds a partially overlapping
    /// interval; a failure at any step rolls the whole move back, so the
    /// negative tagged state is never visible outside the transaction.
    ///
    /// `position` is the 0-based slot among the new parent's children:
    /// `Some(0)` inserts as the first child, `Some(n)` lands after the
    /// n-th existing child, a position past the last child and `None`
    /// both append last. Negative positions are rejected before any
    /// write.
    pub fn move_node(
        &mut self,
        id: NodeId,
        new_parent_id: NodeId,
        position: Option<i64>,
    ) -> Result<(), StoreError> {
        if let Some(position) = position {
            if position < 0 {
                return Err(StoreError::InvalidInput("position must not be less than 0"));
            }
        }
        if id == self.root_id() {
            return Err(StoreError::RootLocked);
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Exclusive)?;

        let Some((lft, rgt)) = node_bounds_tx(&tx, id)? else {
            return Err(StoreError::NodeNotFound { id: id.as_i64() });
        };
        let width = rgt - lft + 1;

        // Detach: park the subtree outside the ordered space.
        park_subtree_tx(&tx, lft, rgt)?;

        // Compact: close the hole the subtree left behind, exactly as
        // delete does.
        shift_lft_tx(&tx, rgt, -width)?;
        shift_rgt_tx(&tx, rgt, -width)?;

        // The destination bounds are only valid after compaction.
        let Some((parent_lft, parent_rgt)) = node_bounds_tx(&tx, new_parent_id)? else {
            return Err(StoreError::NodeNotFound {
                id: new_parent_id.as_i64(),
            });
        };
        if parent_lft < 0 {
            // The destination itself is parked: it lies inside the subtree
            // being moved.
            return Err(StoreError::InvalidInput(
                "cannot move a node under its own subtree",
            ));
        }

        let new_lft = match position {
            Some(position) if position > 0 && parent_rgt - parent_lft > 2 => {
                // Land after the position-th existing child; past the last
                // child this degrades to append-last.
                let prev_sibling_rgt =
                    child_rgt_at_offset_tx(&tx, parent_lft, parent_rgt, position - 1)?
                        .unwrap_or(parent_rgt - 1);
                shift_rgt_tx(&tx, prev_sibling_rgt, width)?;
                shift_lft_tx(&tx, prev_sibling_rgt, width)?;
                prev_sibling_rgt + 1
            }
            None if parent_rgt - parent_lft > 2 => {
                // No position given: append as the last child.
                let prev_sibling_rgt = parent_rgt - 1;
                shift_rgt_tx(&tx, prev_sibling_rgt, width)?;
                shift_lft_tx(&tx, prev_sibling_rgt, width)?;
                prev_sibling_rgt + 1
            }
            _ => {
                // Childless parent, or position 0: first child.
                shift_rgt_tx(&tx, parent_lft, width)?;
                shift_lft_tx(&tx, parent_lft, width)?;
                parent_lft + 1
            }
        };

        // Reattach: a single delta un-parks the subtree and translates
        // every interval in it, so its internal structure is untouched.
        unpark_subtree_tx(&tx, new_lft - lft)?;

        tx.commit()?;
        Ok(())
    }
}
