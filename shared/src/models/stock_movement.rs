//! Stock Movement Models (export/import notes)

use serde::{Deserialize, Serialize};

/// Movement direction relative to the source store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Export,
    Import,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// One product line of a movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockMovementLine {
    pub product_id: i64,
    pub quantity: i32,
}

/// A recorded transfer of product quantity between a source and a
/// destination store, or out to a customer.
///
/// Order-driven exports are created already `Completed` with no
/// destination. Manual inter-store transfers start `Pending` and reach
/// `Completed` only through the approval step, which also writes the
/// mirrored import movement at the destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    pub from_store_id: i64,
    /// None for order-driven exports (stock leaves to a customer)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_store_id: Option<i64>,
    pub creater_id: i64,
    /// Sum of line quantities
    pub total_quantity: i32,
    pub status: MovementStatus,
    pub movement_type: MovementType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub lines: Vec<StockMovementLine>,
    pub created_at: i64,
}

/// Line input for transfer creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferItemInput {
    pub product_id: i64,
    pub quantity: i32,
}

/// Inter-store transfer request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransferRequest {
    pub from_store_id: i64,
    pub to_store_id: i64,
    pub items: Vec<TransferItemInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
