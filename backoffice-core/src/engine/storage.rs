//! redb-based storage layer for the fulfillment engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `inventory` | `(store_id, product_id)` | `i64` | Stock counters |
//! | `orders` | `order_id` | `Order` | Orders with embedded lines/payments |
//! | `ledger_entries` | `entry_id` | `LedgerEntry` | Receipt notes (append-only) |
//! | `aggregate_ledger` | `"totals"` | `AggregateLedger` | Running totals singleton |
//! | `stock_movements` | `movement_id` | `StockMovement` | Export/import notes |
//! | `counters` | name | `i64` | Id allocation |
//!
//! Record values are JSON-serialized. Ids are allocated from the counters
//! table inside the same write transaction as the rows they identify, so an
//! aborted operation never leaks a visible id gap across tables.
//!
//! # Durability
//!
//! redb uses `Durability::Immediate` by default: commits are persistent as
//! soon as `commit()` returns, and the database file is always in a
//! consistent state. A dropped, uncommitted `WriteTransaction` aborts
//! cleanly; this is the rollback half of the engine's transaction
//! boundary.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{AggregateLedger, InventoryRecord, LedgerEntry, Order, StockMovement};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Inventory counters: key = (store_id, product_id), value = quantity
pub(crate) const INVENTORY_TABLE: TableDefinition<(i64, i64), i64> =
    TableDefinition::new("inventory");

/// Orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("orders");

/// Ledger entries: key = entry_id, value = JSON-serialized LedgerEntry
const LEDGER_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("ledger_entries");

/// Aggregate ledger singleton: key = AGGREGATE_KEY, value = JSON-serialized AggregateLedger
const AGGREGATE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("aggregate_ledger");

/// Stock movements: key = movement_id, value = JSON-serialized StockMovement
const MOVEMENTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("stock_movements");

/// Id counters: key = counter name, value = last allocated value
const COUNTERS_TABLE: TableDefinition<&str, i64> = TableDefinition::new("counters");

const AGGREGATE_KEY: &str = "totals";
const ORDER_ID_KEY: &str = "order_id";
const ENTRY_ID_KEY: &str = "entry_id";
const MOVEMENT_ID_KEY: &str = "movement_id";
const ORDER_COUNT_KEY: &str = "order_count";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Engine storage backed by redb
#[derive(Clone)]
pub struct EngineStorage {
    db: Arc<Database>,
}

impl EngineStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Create all tables and seed the aggregate singleton
    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(INVENTORY_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(LEDGER_TABLE)?;
            let _ = write_txn.open_table(MOVEMENTS_TABLE)?;
            let _ = write_txn.open_table(COUNTERS_TABLE)?;

            let mut agg_table = write_txn.open_table(AGGREGATE_TABLE)?;
            if agg_table.get(AGGREGATE_KEY)?.is_none() {
                let value = serde_json::to_vec(&AggregateLedger::default())?;
                agg_table.insert(AGGREGATE_KEY, value.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Id Allocation ==========

    /// Increment and return a named counter (within transaction)
    fn next_counter(&self, txn: &WriteTransaction, key: &str) -> StorageResult<i64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table.get(key)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(key, next)?;
        Ok(next)
    }

    pub fn next_order_id(&self, txn: &WriteTransaction) -> StorageResult<i64> {
        self.next_counter(txn, ORDER_ID_KEY)
    }

    pub fn next_entry_id(&self, txn: &WriteTransaction) -> StorageResult<i64> {
        self.next_counter(txn, ENTRY_ID_KEY)
    }

    pub fn next_movement_id(&self, txn: &WriteTransaction) -> StorageResult<i64> {
        self.next_counter(txn, MOVEMENT_ID_KEY)
    }

    /// Monotonic order counter used for the human order number
    pub fn next_order_count(&self, txn: &WriteTransaction) -> StorageResult<i64> {
        self.next_counter(txn, ORDER_COUNT_KEY)
    }

    // ========== Orders ==========

    /// Store an order (insert or replace) within a transaction
    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id, value.as_slice())?;
        Ok(())
    }

    /// Get an order within an open write transaction
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: i64,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by id (read path)
    pub fn get_order(&self, order_id: i64) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All orders, ascending by id
    pub fn get_all_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    // ========== Ledger Entries ==========

    pub fn put_entry(&self, txn: &WriteTransaction, entry: &LedgerEntry) -> StorageResult<()> {
        let mut table = txn.open_table(LEDGER_TABLE)?;
        let value = serde_json::to_vec(entry)?;
        table.insert(entry.id, value.as_slice())?;
        Ok(())
    }

    pub fn get_entry_txn(
        &self,
        txn: &WriteTransaction,
        entry_id: i64,
    ) -> StorageResult<Option<LedgerEntry>> {
        let table = txn.open_table(LEDGER_TABLE)?;
        match table.get(entry_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_entry(&self, entry_id: i64) -> StorageResult<Option<LedgerEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LEDGER_TABLE)?;
        match table.get(entry_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All ledger entries, ascending by id
    pub fn get_all_entries(&self) -> StorageResult<Vec<LedgerEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LEDGER_TABLE)?;
        let mut entries = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            entries.push(serde_json::from_slice(value.value())?);
        }
        Ok(entries)
    }

    // ========== Aggregate Ledger ==========

    /// Get the aggregate singleton within an open write transaction
    pub fn get_aggregate_txn(&self, txn: &WriteTransaction) -> StorageResult<AggregateLedger> {
        let table = txn.open_table(AGGREGATE_TABLE)?;
        match table.get(AGGREGATE_KEY)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(AggregateLedger::default()),
        }
    }

    /// Replace the aggregate singleton within a transaction
    pub fn put_aggregate(
        &self,
        txn: &WriteTransaction,
        aggregate: &AggregateLedger,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(AGGREGATE_TABLE)?;
        let value = serde_json::to_vec(aggregate)?;
        table.insert(AGGREGATE_KEY, value.as_slice())?;
        Ok(())
    }

    /// Get the aggregate singleton (read path)
    pub fn get_aggregate(&self) -> StorageResult<AggregateLedger> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AGGREGATE_TABLE)?;
        match table.get(AGGREGATE_KEY)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(AggregateLedger::default()),
        }
    }

    // ========== Stock Movements ==========

    pub fn put_movement(
        &self,
        txn: &WriteTransaction,
        movement: &StockMovement,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(MOVEMENTS_TABLE)?;
        let value = serde_json::to_vec(movement)?;
        table.insert(movement.id, value.as_slice())?;
        Ok(())
    }

    pub fn get_movement_txn(
        &self,
        txn: &WriteTransaction,
        movement_id: i64,
    ) -> StorageResult<Option<StockMovement>> {
        let table = txn.open_table(MOVEMENTS_TABLE)?;
        match table.get(movement_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_movement(&self, movement_id: i64) -> StorageResult<Option<StockMovement>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MOVEMENTS_TABLE)?;
        match table.get(movement_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All stock movements, ascending by id
    pub fn get_all_movements(&self) -> StorageResult<Vec<StockMovement>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MOVEMENTS_TABLE)?;
        let mut movements = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            movements.push(serde_json::from_slice(value.value())?);
        }
        Ok(movements)
    }

    // ========== Inventory (read paths; mutation lives in engine::inventory) ==========

    /// Current quantity for a (store, product) pair, None if never stocked
    pub fn quantity(&self, store_id: i64, product_id: i64) -> StorageResult<Option<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INVENTORY_TABLE)?;
        Ok(table.get((store_id, product_id))?.map(|g| g.value()))
    }

    /// All inventory records, for reporting
    pub fn get_all_inventory(&self) -> StorageResult<Vec<InventoryRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INVENTORY_TABLE)?;
        let mut records = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            let (store_id, product_id) = key.value();
            records.push(InventoryRecord {
                store_id,
                product_id,
                quantity: value.value(),
            });
        }
        Ok(records)
    }
}
