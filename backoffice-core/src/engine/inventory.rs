//! Inventory Ledger
//!
//! Atomic stock counters keyed by (store_id, product_id). Every function
//! here operates inside the caller's write transaction: redb admits a
//! single write transaction at a time, so a read-check-decrement in one
//! `reserve` call can never interleave with another writer. That property
//! is what prevents overselling.

use redb::{ReadableTable, WriteTransaction};

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::storage::{INVENTORY_TABLE, StorageError};

/// Atomic check-and-decrement.
///
/// Fails with `InventoryNotFound` when the pair was never stocked (a
/// domain error, not a zero-quantity case) and with `InsufficientStock`
/// when the counter is too low. On failure the caller is expected to drop
/// its transaction, which also rolls back any earlier reservations made
/// in the same operation.
pub fn reserve(
    txn: &WriteTransaction,
    store_id: i64,
    product_id: i64,
    quantity: i32,
) -> EngineResult<()> {
    if quantity <= 0 {
        return Err(EngineError::InvalidQuantity(format!(
            "reserve quantity must be positive, got {quantity}"
        )));
    }
    let mut table = txn
        .open_table(INVENTORY_TABLE)
        .map_err(StorageError::from)?;
    let current = table
        .get((store_id, product_id))
        .map_err(StorageError::from)?
        .map(|g| g.value());
    let Some(available) = current else {
        return Err(EngineError::InventoryNotFound {
            store_id,
            product_id,
        });
    };
    if i64::from(quantity) > available {
        return Err(EngineError::InsufficientStock {
            product_id,
            requested: quantity,
            available,
        });
    }
    table
        .insert((store_id, product_id), available - i64::from(quantity))
        .map_err(StorageError::from)?;
    Ok(())
}

/// Add stock back to a store, creating the record if it is missing.
///
/// Used by order cancellation; always succeeds.
pub fn release(
    txn: &WriteTransaction,
    store_id: i64,
    product_id: i64,
    quantity: i32,
) -> EngineResult<()> {
    add(txn, store_id, product_id, quantity)
}

/// Create-or-increment a stock counter.
///
/// Used for initial stock provisioning and by transfer approval at the
/// destination store.
pub fn provision(
    txn: &WriteTransaction,
    store_id: i64,
    product_id: i64,
    quantity: i32,
) -> EngineResult<()> {
    add(txn, store_id, product_id, quantity)
}

fn add(txn: &WriteTransaction, store_id: i64, product_id: i64, quantity: i32) -> EngineResult<()> {
    if quantity <= 0 {
        return Err(EngineError::InvalidQuantity(format!(
            "stock adjustment must be positive, got {quantity}"
        )));
    }
    let mut table = txn
        .open_table(INVENTORY_TABLE)
        .map_err(StorageError::from)?;
    let current = table
        .get((store_id, product_id))
        .map_err(StorageError::from)?
        .map(|g| g.value())
        .unwrap_or(0);
    table
        .insert((store_id, product_id), current + i64::from(quantity))
        .map_err(StorageError::from)?;
    Ok(())
}

/// Current quantity within an open write transaction
pub fn quantity_txn(
    txn: &WriteTransaction,
    store_id: i64,
    product_id: i64,
) -> EngineResult<Option<i64>> {
    let table = txn
        .open_table(INVENTORY_TABLE)
        .map_err(StorageError::from)?;
    Ok(table
        .get((store_id, product_id))
        .map_err(StorageError::from)?
        .map(|g| g.value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::storage::EngineStorage;

    #[test]
    fn test_reserve_decrements() {
        let storage = EngineStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        provision(&txn, 1, 10, 5).unwrap();
        reserve(&txn, 1, 10, 3).unwrap();
        assert_eq!(quantity_txn(&txn, 1, 10).unwrap(), Some(2));
        txn.commit().unwrap();

        assert_eq!(storage.quantity(1, 10).unwrap(), Some(2));
    }

    #[test]
    fn test_reserve_insufficient() {
        let storage = EngineStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        provision(&txn, 1, 10, 2).unwrap();
        let err = reserve(&txn, 1, 10, 3).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientStock {
                product_id: 10,
                requested: 3,
                available: 2,
            }
        ));
        // counter untouched
        assert_eq!(quantity_txn(&txn, 1, 10).unwrap(), Some(2));
    }

    #[test]
    fn test_missing_record_is_not_zero() {
        let storage = EngineStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let err = reserve(&txn, 1, 99, 1).unwrap_err();
        assert!(matches!(err, EngineError::InventoryNotFound { .. }));
    }

    #[test]
    fn test_release_creates_missing_record() {
        let storage = EngineStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        release(&txn, 2, 10, 4).unwrap();
        assert_eq!(quantity_txn(&txn, 2, 10).unwrap(), Some(4));
    }

    #[test]
    fn test_provision_increments_existing() {
        let storage = EngineStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        provision(&txn, 1, 10, 5).unwrap();
        provision(&txn, 1, 10, 7).unwrap();
        assert_eq!(quantity_txn(&txn, 1, 10).unwrap(), Some(12));
    }

    #[test]
    fn test_exact_reserve_leaves_zero_row() {
        let storage = EngineStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        provision(&txn, 1, 10, 5).unwrap();
        reserve(&txn, 1, 10, 5).unwrap();
        // record survives at zero; a later reserve fails as insufficient,
        // not as missing
        assert_eq!(quantity_txn(&txn, 1, 10).unwrap(), Some(0));
        let err = reserve(&txn, 1, 10, 1).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientStock { .. }));
    }
}
