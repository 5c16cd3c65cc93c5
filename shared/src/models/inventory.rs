//! Inventory Record Model

use serde::{Deserialize, Serialize};

/// Stock counter for one (store, product) pair.
///
/// The quantity is never negative and is mutated only through the
/// inventory ledger's atomic adjust operations. The record is created on
/// first stock provisioning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryRecord {
    pub store_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}
