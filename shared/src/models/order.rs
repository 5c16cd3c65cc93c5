//! Order Model

use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// Payment settlement status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

/// Shipping progress, tracked independently of the payment lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingStatus {
    #[default]
    Processing,
    Completed,
    Cancelled,
}

/// Payment instrument
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Bank,
}

/// Order line item. Immutable once created; owned by its order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i32,
    /// Price per unit in currency unit
    pub unit_price: f64,
    /// quantity × unit_price
    pub total_price: f64,
}

/// A payment recorded against an order. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub method: PaymentMethod,
    /// Amount in currency unit
    pub amount: f64,
    /// UTC millis
    pub time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Human-facing order number (`ORD<yyyymmdd><n>`)
    pub code: String,
    pub store_id: i64,
    pub creater_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    /// Sum of line quantities
    pub quantity: i32,
    /// Amount before discount
    pub gross_amount: f64,
    /// Whole-order discount percent, 0..=100
    pub discount_percent: f64,
    /// Amount after discount
    pub total_amount: f64,
    pub paid_amount: f64,
    pub remain_amount: f64,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub shipping_status: ShippingStatus,
    /// Soft-delete marker; orders are never hard-deleted
    pub is_deleted: bool,
    pub lines: Vec<OrderLine>,
    pub payments: Vec<PaymentRecord>,
    /// Ledger entries posted for this order, one per payment
    pub ledger_entry_ids: Vec<i64>,
    /// The order-scoped export movement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Line input for order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i32,
    /// Price per unit in currency unit
    pub unit_price: f64,
}

/// Payment input, supplied at order creation or added later
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub method: PaymentMethod,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Order creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub store_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    pub items: Vec<OrderItemInput>,
    /// Whole-order discount percent; None means no discount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
    /// Zero or more payment instruments settled up front
    #[serde(default)]
    pub payments: Vec<PaymentInput>,
}
