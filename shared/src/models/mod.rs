//! Domain models
//!
//! One file per aggregate, mirrored by the storage tables in
//! `backoffice-core`. Monetary amounts are `f64` in currency units; all
//! arithmetic on them goes through the engine's decimal helpers.

pub mod inventory;
pub mod ledger;
pub mod order;
pub mod product;
pub mod stock_movement;
pub mod store;

pub use inventory::InventoryRecord;
pub use ledger::{AggregateLedger, EntryStatus, EntryType, LedgerEntry};
pub use order::{
    CreateOrderRequest, Order, OrderItemInput, OrderLine, OrderStatus, PaymentInput,
    PaymentMethod, PaymentRecord, PaymentStatus, ShippingStatus,
};
pub use product::Product;
pub use stock_movement::{
    CreateTransferRequest, MovementStatus, MovementType, StockMovement, StockMovementLine,
    TransferItemInput,
};
pub use store::Store;
