#![forbid(unsafe_code)]

use super::bounds::{delete_subtree_tx, node_bounds_tx, shift_lft_tx, shift_rgt_tx};
use super::{SqliteStore, StoreError};
use nt_core::ids::NodeId;
use rusqlite::TransactionBehavior;

impl SqliteStore {
    /// Delete a node together with its entire subtree, then compact the
    /// remaining bounds to close the gap.
    ///
    /// Containment is a pure interval relation, so the subtree goes in
    /// one predicate-based statement with no child enumeration.
    pub fn delete(&mut self, id: NodeId) -> Result<(), StoreError> {
        if id == self.root_id() {
            return Err(StoreError::RootLocked);
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Exclusive)?;

        let Some((lft, rgt)) = node_bounds_tx(&tx, id)? else {
            return Err(StoreError::NodeNotFound { id: id.as_i64() });
        };

        delete_subtree_tx(&tx, lft, rgt)?;

        let width = rgt - lft + 1;
        shift_lft_tx(&tx, rgt, -width)?;
        shift_rgt_tx(&tx, rgt, -width)?;

        tx.commit()?;
        Ok(())
    }
}
