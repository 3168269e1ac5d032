#![forbid(unsafe_code)]

use super::bounds::{insert_node_tx, node_bounds_tx, shift_lft_tx, shift_rgt_tx};
use super::{SqliteStore, StoreError, node_id_from_row};
use nt_core::ids::NodeId;
use rusqlite::TransactionBehavior;

impl SqliteStore {
    /// Insert a new leaf (width 2) under `parent_id` and return its id.
    ///
    /// The rest of the table is shifted before the insert, all inside one
    /// exclusive transaction, so no reader ever observes an interval that
    /// partially overlaps another.
    pub fn create(&mut self, name: &str, parent_id: NodeId) -> Result<NodeId, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::InvalidInput("name must not be empty"));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Exclusive)?;

        let Some((parent_lft, parent_rgt)) = node_bounds_tx(&tx, parent_id)? else {
            return Err(StoreError::NodeNotFound {
                id: parent_id.as_i64(),
            });
        };

        let lft = if parent_rgt - parent_lft > 2 {
            // Parent already has children: append after the last one. Its
            // right edge is always parent_rgt - 1, no child enumeration
            // needed.
            let prev_sibling_rgt = parent_rgt - 1;
            shift_rgt_tx(&tx, prev_sibling_rgt, 2)?;
            shift_lft_tx(&tx, prev_sibling_rgt, 2)?;
            prev_sibling_rgt + 1
        } else {
            // Childless parent: the new node becomes its first child.
            shift_rgt_tx(&tx, parent_lft, 2)?;
            shift_lft_tx(&tx, parent_lft, 2)?;
            parent_lft + 1
        };

        let raw_id = insert_node_tx(&tx, name, lft, lft + 1)?;
        let id = node_id_from_row(raw_id)?;

        tx.commit()?;
        Ok(id)
    }
}
