//! Engine error taxonomy
//!
//! Four families, matching how callers should react:
//! - Validation errors are rejected before any mutation.
//! - Domain conflicts are rejected after read, before commit; the
//!   transaction is dropped so any partial reservation rolls back.
//! - `Contention` is retryable.
//! - `Storage` is an opaque infrastructure failure; the operation's
//!   transaction is dropped and nothing is committed.

use crate::engine::storage::StorageError;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the fulfillment engine
#[derive(Debug, Error)]
pub enum EngineError {
    // ========== Validation ==========
    #[error("Item list is empty")]
    EmptyItems,

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Discount percent must be between 0 and 100, got {0}")]
    InvalidDiscount(f64),

    #[error("Payments ({paid:.2}) exceed amount due ({due:.2})")]
    Overpayment { paid: f64, due: f64 },

    // ========== Domain Conflicts ==========
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i32,
        available: i64,
    },

    #[error("No inventory record for product {product_id} in store {store_id}")]
    InventoryNotFound { store_id: i64, product_id: i64 },

    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Store not found: {0}")]
    StoreNotFound(i64),

    #[error("Customer not found: {0}")]
    CustomerNotFound(i64),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Order already cancelled: {0}")]
    OrderCancelled(i64),

    #[error("Ledger entry not found: {0}")]
    EntryNotFound(i64),

    #[error("Stock movement not found: {0}")]
    MovementNotFound(i64),

    #[error("Invalid movement state: {0}")]
    InvalidMovementState(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    // ========== Contention ==========
    #[error("Timed out waiting for the engine write lock")]
    Contention,

    // ========== Infrastructure ==========
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl EngineError {
    /// Whether the caller may safely retry the operation as-is
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Contention)
    }
}
