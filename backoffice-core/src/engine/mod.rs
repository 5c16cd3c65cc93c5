//! Order-Fulfillment Engine
//!
//! This module implements the transactional core of the back office:
//!
//! - **storage**: redb-based persistence layer (tables, id counters)
//! - **inventory**: atomic per-(store, product) stock counters
//! - **money**: pure discount/payment totals calculator
//! - **ledger**: THU/CHI receipt notes + the aggregate totals singleton
//! - **manager**: the `FulfillmentManager` transaction coordinator
//! - **transfer**: two-phase inter-store stock transfers
//! - **reports**: read-only revenue queries over committed state
//!
//! # Operation Flow
//!
//! ```text
//! create_order(request)
//!     ├─ 1. Resolve store/products/customer (read-only collaborators)
//!     ├─ 2. Compute totals (pure, validation errors surface here)
//!     ├─ 3. Acquire write gate (bounded wait)
//!     ├─ 4. Begin write transaction
//!     ├─ 5. Reserve inventory per line
//!     ├─ 6. Write order + lines, post ledger entries, write export movement
//!     ├─ 7. Commit transaction
//!     └─ 8. Return composed outcome
//! ```
//!
//! Any error between 4 and 7 drops the transaction, which rolls back every
//! reservation and row written so far. No partial state is ever visible.

pub mod error;
pub mod inventory;
pub mod ledger;
pub mod manager;
pub mod money;
pub mod reports;
pub mod storage;
pub mod transfer;

// Re-exports
pub use error::{EngineError, EngineResult};
pub use ledger::PostEntry;
pub use manager::{CreateOrderOutcome, FulfillmentManager};
pub use money::OrderTotals;
pub use reports::DailyRevenue;
pub use storage::{EngineStorage, StorageError, StorageResult};
