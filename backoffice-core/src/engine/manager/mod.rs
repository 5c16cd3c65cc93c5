//! FulfillmentManager - Order transaction coordination
//!
//! This module handles:
//! - Order creation (inventory reservation, totals, ledger posting,
//!   order-scoped export movement)
//! - Later payments against pending orders
//! - Compensating cancellation
//! - Guarded status transitions
//! - Ad-hoc receipt notes
//!
//! Every mutating operation is one redb write transaction bracketed by a
//! bounded write gate. The gate keeps a slow writer from blocking callers
//! indefinitely: when the wait exceeds `lock_wait`, the operation fails
//! with the retryable `Contention` error instead of deadlocking.

#[cfg(test)]
mod tests;

use chrono::Utc;
use parking_lot::Mutex;
use redb::WriteTransaction;
use shared::models::{
    CreateOrderRequest, EntryType, InventoryRecord, LedgerEntry, MovementStatus, MovementType,
    Order, OrderLine, OrderStatus, PaymentInput, PaymentRecord, PaymentStatus, ShippingStatus,
    StockMovement, StockMovementLine,
};
use shared::util::now_millis;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::inventory;
use crate::engine::ledger::{self, PostEntry};
use crate::engine::money::{self, MONEY_TOLERANCE, to_decimal, to_f64};
use crate::engine::storage::{EngineStorage, StorageError};
use crate::services::{Catalog, CustomerDirectory, StoreRegistry};

/// Default bound on waiting for the write gate
const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);

/// Composed result of a successful order creation
#[derive(Debug, Clone)]
pub struct CreateOrderOutcome {
    pub order: Order,
    /// One THU entry per payment instrument
    pub entries: Vec<LedgerEntry>,
}

/// Order transaction coordinator
///
/// Holds the storage handle and the read-only collaborator seams. All
/// methods take `&self`; the manager is shared across request handlers
/// behind an `Arc`.
pub struct FulfillmentManager {
    storage: EngineStorage,
    catalog: Arc<dyn Catalog>,
    stores: Arc<dyn StoreRegistry>,
    customers: Arc<dyn CustomerDirectory>,
    /// Serializes mutating operations with a bounded wait
    write_gate: Mutex<()>,
    lock_wait: Duration,
}

impl FulfillmentManager {
    /// Open or create the engine database at the given path
    pub fn open(
        path: impl AsRef<Path>,
        catalog: Arc<dyn Catalog>,
        stores: Arc<dyn StoreRegistry>,
        customers: Arc<dyn CustomerDirectory>,
    ) -> EngineResult<Self> {
        let storage = EngineStorage::open(path)?;
        tracing::info!("Fulfillment engine opened");
        Ok(Self {
            storage,
            catalog,
            stores,
            customers,
            write_gate: Mutex::new(()),
            lock_wait: DEFAULT_LOCK_WAIT,
        })
    }

    /// Override the bounded wait for the write gate
    pub fn with_lock_wait(mut self, lock_wait: Duration) -> Self {
        self.lock_wait = lock_wait;
        self
    }

    /// Create a manager over an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory(
        catalog: Arc<dyn Catalog>,
        stores: Arc<dyn StoreRegistry>,
        customers: Arc<dyn CustomerDirectory>,
    ) -> EngineResult<Self> {
        let storage = EngineStorage::open_in_memory()?;
        Ok(Self {
            storage,
            catalog,
            stores,
            customers,
            write_gate: Mutex::new(()),
            lock_wait: DEFAULT_LOCK_WAIT,
        })
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &EngineStorage {
        &self.storage
    }

    pub(crate) fn stores(&self) -> &dyn StoreRegistry {
        self.stores.as_ref()
    }

    pub(crate) fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    /// Acquire the write gate within the bounded wait
    pub(crate) fn write_guard(&self) -> EngineResult<parking_lot::MutexGuard<'_, ()>> {
        self.write_gate
            .try_lock_for(self.lock_wait)
            .ok_or(EngineError::Contention)
    }

    /// Generate the human order number (crash-safe via the counter table)
    fn order_code(&self, txn: &WriteTransaction) -> EngineResult<String> {
        let count = self.storage.next_order_count(txn)?;
        let date_str = Utc::now().format("%Y%m%d").to_string();
        Ok(format!("ORD{}{}", date_str, 10000 + count))
    }

    // ========== Order Creation ==========

    /// Create an order: reserve stock, compute totals, post payments,
    /// record the order-scoped export movement.
    ///
    /// All writes commit as one atomic unit. Any failure after the first
    /// reservation drops the transaction, which rolls back inventory,
    /// order rows and ledger postings together.
    pub fn create_order(
        &self,
        request: CreateOrderRequest,
        creater_id: i64,
    ) -> EngineResult<CreateOrderOutcome> {
        // 1. Resolve collaborators (read-only, before any mutation)
        if self.stores.store(request.store_id).is_none() {
            return Err(EngineError::StoreNotFound(request.store_id));
        }
        for item in &request.items {
            if self.catalog.product(item.product_id).is_none() {
                return Err(EngineError::ProductNotFound(item.product_id));
            }
        }
        if let Some(customer_id) = request.customer_id
            && !self.customers.customer_exists(customer_id)
        {
            return Err(EngineError::CustomerNotFound(customer_id));
        }

        // 2. Compute totals (pure; validation errors surface here)
        let discount_percent = request.discount_percent.unwrap_or(0.0);
        let totals = money::compute(&request.items, discount_percent, &request.payments)?;

        // 3. Single write transaction for everything that mutates
        let _gate = self.write_guard()?;
        let txn = self.storage.begin_write()?;
        let outcome = self.create_order_txn(&txn, &request, creater_id, discount_percent, &totals)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = outcome.order.id,
            code = %outcome.order.code,
            store_id = outcome.order.store_id,
            total = outcome.order.total_amount,
            payments = outcome.entries.len(),
            "Order created"
        );
        Ok(outcome)
    }

    fn create_order_txn(
        &self,
        txn: &WriteTransaction,
        request: &CreateOrderRequest,
        creater_id: i64,
        discount_percent: f64,
        totals: &money::OrderTotals,
    ) -> EngineResult<CreateOrderOutcome> {
        // Reserve every line first; the first shortage aborts the whole
        // operation and the dropped transaction restores earlier lines
        for item in &request.items {
            inventory::reserve(txn, request.store_id, item.product_id, item.quantity)?;
        }

        let order_id = self.storage.next_order_id(txn)?;
        let code = self.order_code(txn)?;
        let now = now_millis();

        // One THU entry per payment instrument
        let mut entries = Vec::with_capacity(request.payments.len());
        let mut payments = Vec::with_capacity(request.payments.len());
        for payment in &request.payments {
            let entry = ledger::post(&self.storage, txn, PostEntry {
                order_id: Some(order_id),
                store_id: request.store_id,
                creater_id,
                amount: payment.amount,
                method: payment.method,
                entry_type: EntryType::Thu,
                note: payment.note.clone(),
                counterparty: None,
            })?;
            entries.push(entry);
            payments.push(PaymentRecord {
                method: payment.method,
                amount: payment.amount,
                time: now,
                note: payment.note.clone(),
            });
        }

        // Order-scoped export movement, already completed: stock left the
        // store towards a customer, there is no destination store
        let movement_id = self.storage.next_movement_id(txn)?;
        let movement = StockMovement {
            id: movement_id,
            order_id: Some(order_id),
            from_store_id: request.store_id,
            to_store_id: None,
            creater_id,
            total_quantity: totals.total_quantity,
            status: MovementStatus::Completed,
            movement_type: MovementType::Export,
            note: None,
            lines: request
                .items
                .iter()
                .map(|item| StockMovementLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
            created_at: now,
        };
        self.storage.put_movement(txn, &movement)?;

        let order = Order {
            id: order_id,
            code,
            store_id: request.store_id,
            creater_id,
            customer_id: request.customer_id,
            quantity: totals.total_quantity,
            gross_amount: totals.gross_amount,
            discount_percent,
            total_amount: totals.net_amount,
            paid_amount: totals.paid_amount,
            remain_amount: totals.remain_amount,
            payment_status: totals.payment_status,
            order_status: totals.order_status,
            shipping_status: ShippingStatus::Processing,
            is_deleted: false,
            lines: request
                .items
                .iter()
                .map(|item| OrderLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    total_price: to_f64(
                        to_decimal(item.unit_price) * rust_decimal::Decimal::from(item.quantity),
                    ),
                })
                .collect(),
            payments,
            ledger_entry_ids: entries.iter().map(|e| e.id).collect(),
            movement_id: Some(movement_id),
            created_at: now,
            updated_at: now,
        };
        self.storage.put_order(txn, &order)?;

        Ok(CreateOrderOutcome { order, entries })
    }

    // ========== Later Payments ==========

    /// Add a payment to a live order.
    ///
    /// Rejects overpayment against the remaining balance; settling the
    /// balance flips the order to `Completed`/`Paid`.
    pub fn add_payment(&self, order_id: i64, payment: PaymentInput) -> EngineResult<Order> {
        money::validate_payment(&payment)?;

        let _gate = self.write_guard()?;
        let txn = self.storage.begin_write()?;
        let order = self.add_payment_txn(&txn, order_id, payment)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id,
            paid = order.paid_amount,
            remain = order.remain_amount,
            "Payment added"
        );
        Ok(order)
    }

    fn add_payment_txn(
        &self,
        txn: &WriteTransaction,
        order_id: i64,
        payment: PaymentInput,
    ) -> EngineResult<Order> {
        let Some(mut order) = self.storage.get_order_txn(txn, order_id)? else {
            return Err(EngineError::OrderNotFound(order_id));
        };
        if order.is_deleted || order.order_status == OrderStatus::Cancelled {
            return Err(EngineError::OrderCancelled(order_id));
        }

        // Overpayment guard: reject if amount exceeds remaining
        let remaining = to_decimal(order.remain_amount);
        if to_decimal(payment.amount) > remaining + MONEY_TOLERANCE {
            return Err(EngineError::Overpayment {
                paid: to_f64(to_decimal(order.paid_amount) + to_decimal(payment.amount)),
                due: order.total_amount,
            });
        }

        let entry = ledger::post(&self.storage, txn, PostEntry {
            order_id: Some(order_id),
            store_id: order.store_id,
            creater_id: order.creater_id,
            amount: payment.amount,
            method: payment.method,
            entry_type: EntryType::Thu,
            note: payment.note.clone(),
            counterparty: None,
        })?;

        let now = now_millis();
        order.payments.push(PaymentRecord {
            method: payment.method,
            amount: payment.amount,
            time: now,
            note: payment.note,
        });
        order.ledger_entry_ids.push(entry.id);

        let paid = to_decimal(order.paid_amount) + to_decimal(payment.amount);
        let remain = to_decimal(order.total_amount) - paid;
        let settled = remain.abs() <= MONEY_TOLERANCE;
        order.paid_amount = to_f64(paid);
        order.remain_amount = if settled { 0.0 } else { to_f64(remain) };
        if settled {
            order.payment_status = PaymentStatus::Paid;
            order.order_status = OrderStatus::Completed;
        }
        order.updated_at = now;
        self.storage.put_order(txn, &order)?;
        Ok(order)
    }

    // ========== Cancellation ==========

    /// Compensating cancellation: restore stock to the originating store,
    /// reverse every ledger entry, cancel the export movement, soft-delete
    /// the order.
    ///
    /// Cancelling an already-cancelled order is an explicit error so stock
    /// can never be double-released.
    pub fn cancel_order(&self, order_id: i64) -> EngineResult<Order> {
        let _gate = self.write_guard()?;
        let txn = self.storage.begin_write()?;
        let order = self.cancel_order_txn(&txn, order_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, "Order cancelled");
        Ok(order)
    }

    fn cancel_order_txn(&self, txn: &WriteTransaction, order_id: i64) -> EngineResult<Order> {
        let Some(mut order) = self.storage.get_order_txn(txn, order_id)? else {
            return Err(EngineError::OrderNotFound(order_id));
        };
        if order.is_deleted || order.order_status == OrderStatus::Cancelled {
            return Err(EngineError::OrderCancelled(order_id));
        }

        // Stock goes back to the store the order was sold from
        for line in &order.lines {
            inventory::release(txn, order.store_id, line.product_id, line.quantity)?;
        }

        for entry_id in &order.ledger_entry_ids {
            ledger::reverse(&self.storage, txn, *entry_id)?;
        }

        if let Some(movement_id) = order.movement_id {
            let Some(mut movement) = self.storage.get_movement_txn(txn, movement_id)? else {
                return Err(EngineError::MovementNotFound(movement_id));
            };
            movement.status = MovementStatus::Cancelled;
            self.storage.put_movement(txn, &movement)?;
        }

        order.is_deleted = true;
        order.order_status = OrderStatus::Cancelled;
        order.payment_status = PaymentStatus::Cancelled;
        order.shipping_status = ShippingStatus::Cancelled;
        order.updated_at = now_millis();
        self.storage.put_order(txn, &order)?;
        Ok(order)
    }

    // ========== Status Updates ==========

    /// Guarded order/payment status transition.
    ///
    /// Transitions out of `Cancelled` are rejected, and cancellation must
    /// go through [`cancel_order`](Self::cancel_order) so compensation is
    /// never skipped.
    pub fn update_order_status(
        &self,
        order_id: i64,
        order_status: OrderStatus,
        payment_status: Option<PaymentStatus>,
    ) -> EngineResult<Order> {
        if order_status == OrderStatus::Cancelled
            || payment_status == Some(PaymentStatus::Cancelled)
        {
            return Err(EngineError::InvalidOperation(
                "cancellation must go through cancel_order".to_string(),
            ));
        }

        let _gate = self.write_guard()?;
        let txn = self.storage.begin_write()?;
        let Some(mut order) = self.storage.get_order_txn(&txn, order_id)? else {
            return Err(EngineError::OrderNotFound(order_id));
        };
        if order.is_deleted || order.order_status == OrderStatus::Cancelled {
            return Err(EngineError::OrderCancelled(order_id));
        }

        order.order_status = order_status;
        if let Some(payment_status) = payment_status {
            order.payment_status = payment_status;
        }
        order.updated_at = now_millis();
        self.storage.put_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, status = ?order.order_status, "Order status updated");
        Ok(order)
    }

    /// Guarded shipping status transition, tracked independently of the
    /// payment lifecycle
    pub fn update_shipping_status(
        &self,
        order_id: i64,
        shipping_status: ShippingStatus,
    ) -> EngineResult<Order> {
        let _gate = self.write_guard()?;
        let txn = self.storage.begin_write()?;
        let Some(mut order) = self.storage.get_order_txn(&txn, order_id)? else {
            return Err(EngineError::OrderNotFound(order_id));
        };
        if order.is_deleted || order.order_status == OrderStatus::Cancelled {
            return Err(EngineError::OrderCancelled(order_id));
        }
        if order.shipping_status == ShippingStatus::Cancelled {
            return Err(EngineError::InvalidOperation(format!(
                "shipping for order {} is cancelled",
                order_id
            )));
        }

        order.shipping_status = shipping_status;
        order.updated_at = now_millis();
        self.storage.put_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, status = ?order.shipping_status, "Shipping status updated");
        Ok(order)
    }

    // ========== Ad-hoc Ledger Entries ==========

    /// Post a receipt note not tied to an order (e.g. rent paid from the
    /// cash drawer, a supplier refund)
    pub fn post_manual_entry(&self, input: PostEntry) -> EngineResult<LedgerEntry> {
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(EngineError::InvalidAmount(format!(
                "entry amount must be positive, got {}",
                input.amount
            )));
        }
        if self.stores.store(input.store_id).is_none() {
            return Err(EngineError::StoreNotFound(input.store_id));
        }

        let _gate = self.write_guard()?;
        let txn = self.storage.begin_write()?;
        let entry = ledger::post(&self.storage, &txn, input)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(entry)
    }

    /// Reverse a ledger entry by id. Idempotent at the ledger layer.
    pub fn reverse_entry(&self, entry_id: i64) -> EngineResult<LedgerEntry> {
        let _gate = self.write_guard()?;
        let txn = self.storage.begin_write()?;
        let entry = ledger::reverse(&self.storage, &txn, entry_id)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(entry)
    }

    // ========== Stock Provisioning ==========

    /// Create-or-increment stock for a (store, product) pair. Returns the
    /// new quantity.
    pub fn provision_stock(
        &self,
        store_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> EngineResult<i64> {
        if self.stores.store(store_id).is_none() {
            return Err(EngineError::StoreNotFound(store_id));
        }
        if self.catalog.product(product_id).is_none() {
            return Err(EngineError::ProductNotFound(product_id));
        }

        let _gate = self.write_guard()?;
        let txn = self.storage.begin_write()?;
        inventory::provision(&txn, store_id, product_id, quantity)?;
        let new_quantity = inventory::quantity_txn(&txn, store_id, product_id)?.unwrap_or(0);
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(store_id, product_id, quantity = new_quantity, "Stock provisioned");
        Ok(new_quantity)
    }

    // ========== Read Paths ==========

    /// Get an order snapshot by id
    pub fn order(&self, order_id: i64) -> EngineResult<Option<Order>> {
        Ok(self.storage.get_order(order_id)?)
    }

    /// All orders, ascending by id
    pub fn orders(&self) -> EngineResult<Vec<Order>> {
        Ok(self.storage.get_all_orders()?)
    }

    /// Get a ledger entry by id
    pub fn ledger_entry(&self, entry_id: i64) -> EngineResult<Option<LedgerEntry>> {
        Ok(self.storage.get_entry(entry_id)?)
    }

    /// All ledger entries, ascending by id
    pub fn ledger_entries(&self) -> EngineResult<Vec<LedgerEntry>> {
        Ok(self.storage.get_all_entries()?)
    }

    /// Get a stock movement by id
    pub fn movement(&self, movement_id: i64) -> EngineResult<Option<StockMovement>> {
        Ok(self.storage.get_movement(movement_id)?)
    }

    /// All stock movements, ascending by id
    pub fn movements(&self) -> EngineResult<Vec<StockMovement>> {
        Ok(self.storage.get_all_movements()?)
    }

    /// Current stock for a (store, product) pair, None if never stocked
    pub fn stock_level(&self, store_id: i64, product_id: i64) -> EngineResult<Option<i64>> {
        Ok(self.storage.quantity(store_id, product_id)?)
    }

    /// All inventory records
    pub fn inventory(&self) -> EngineResult<Vec<InventoryRecord>> {
        Ok(self.storage.get_all_inventory()?)
    }
}
