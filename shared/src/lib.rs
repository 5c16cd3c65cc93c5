//! Shared domain types for the back-office platform
//!
//! This crate holds the models and operation inputs that the engine and the
//! API layer both consume. It contains data only; all behavior (validation,
//! money math, persistence) lives in `backoffice-core`.

pub mod models;
pub mod util;

// Re-export 公共类型
pub use models::{
    AggregateLedger, CreateOrderRequest, CreateTransferRequest, EntryStatus, EntryType,
    InventoryRecord, LedgerEntry, MovementStatus, MovementType, Order, OrderItemInput, OrderLine,
    OrderStatus, PaymentInput, PaymentMethod, PaymentRecord, PaymentStatus, Product,
    ShippingStatus, StockMovement, StockMovementLine, Store, TransferItemInput,
};
