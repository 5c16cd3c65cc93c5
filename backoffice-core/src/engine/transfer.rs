//! Stock Transfer Workflow
//!
//! Two-phase inter-store movement over the same inventory ledger the order
//! path uses. Creation reserves stock at the source and records an
//! `Export`/`Pending` movement; approval provisions the destination, flips
//! the source movement to `Completed` and writes the mirrored `Import`
//! movement. Approving a non-pending movement is an error, which is what
//! keeps the destination from being credited twice.

use redb::WriteTransaction;
use shared::models::{
    CreateTransferRequest, MovementStatus, MovementType, StockMovement, StockMovementLine,
};
use shared::util::now_millis;

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::inventory;
use crate::engine::manager::FulfillmentManager;
use crate::engine::storage::StorageError;

impl FulfillmentManager {
    /// Start a transfer: reserve stock at the source store and record the
    /// pending export movement. Insufficient stock aborts with nothing
    /// created.
    pub fn create_transfer(
        &self,
        request: CreateTransferRequest,
        creater_id: i64,
    ) -> EngineResult<StockMovement> {
        if request.items.is_empty() {
            return Err(EngineError::EmptyItems);
        }
        if request.from_store_id == request.to_store_id {
            return Err(EngineError::InvalidOperation(
                "source and destination store must differ".to_string(),
            ));
        }
        if self.stores().store(request.from_store_id).is_none() {
            return Err(EngineError::StoreNotFound(request.from_store_id));
        }
        if self.stores().store(request.to_store_id).is_none() {
            return Err(EngineError::StoreNotFound(request.to_store_id));
        }
        let mut total_quantity: i32 = 0;
        for item in &request.items {
            if item.quantity <= 0 {
                return Err(EngineError::InvalidQuantity(format!(
                    "transfer quantity must be positive, got {}",
                    item.quantity
                )));
            }
            if self.catalog().product(item.product_id).is_none() {
                return Err(EngineError::ProductNotFound(item.product_id));
            }
            total_quantity += item.quantity;
        }

        let _gate = self.write_guard()?;
        let txn = self.storage().begin_write()?;
        let movement = self.create_transfer_txn(&txn, &request, creater_id, total_quantity)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            movement_id = movement.id,
            from_store_id = movement.from_store_id,
            to_store_id = ?movement.to_store_id,
            total_quantity,
            "Transfer created"
        );
        Ok(movement)
    }

    fn create_transfer_txn(
        &self,
        txn: &WriteTransaction,
        request: &CreateTransferRequest,
        creater_id: i64,
        total_quantity: i32,
    ) -> EngineResult<StockMovement> {
        for item in &request.items {
            inventory::reserve(txn, request.from_store_id, item.product_id, item.quantity)?;
        }

        let movement_id = self.storage().next_movement_id(txn)?;
        let movement = StockMovement {
            id: movement_id,
            order_id: None,
            from_store_id: request.from_store_id,
            to_store_id: Some(request.to_store_id),
            creater_id,
            total_quantity,
            status: MovementStatus::Pending,
            movement_type: MovementType::Export,
            note: request.note.clone(),
            lines: request
                .items
                .iter()
                .map(|item| StockMovementLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
            created_at: now_millis(),
        };
        self.storage().put_movement(txn, &movement)?;
        Ok(movement)
    }

    /// Approve a pending transfer: credit the destination store and write
    /// the mirrored import movement.
    ///
    /// Exactly-once: a second approval fails with `InvalidMovementState`
    /// instead of crediting the destination again.
    pub fn approve_transfer(
        &self,
        movement_id: i64,
        approver_id: i64,
    ) -> EngineResult<StockMovement> {
        let _gate = self.write_guard()?;
        let txn = self.storage().begin_write()?;
        let movement = self.approve_transfer_txn(&txn, movement_id, approver_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(movement_id, approver_id, "Transfer approved");
        Ok(movement)
    }

    fn approve_transfer_txn(
        &self,
        txn: &WriteTransaction,
        movement_id: i64,
        approver_id: i64,
    ) -> EngineResult<StockMovement> {
        let Some(mut movement) = self.storage().get_movement_txn(txn, movement_id)? else {
            return Err(EngineError::MovementNotFound(movement_id));
        };
        if movement.movement_type != MovementType::Export
            || movement.status != MovementStatus::Pending
        {
            return Err(EngineError::InvalidMovementState(format!(
                "movement {} is {:?}/{:?}, expected EXPORT/PENDING",
                movement_id, movement.movement_type, movement.status
            )));
        }
        let Some(to_store_id) = movement.to_store_id else {
            return Err(EngineError::InvalidMovementState(format!(
                "movement {} has no destination store",
                movement_id
            )));
        };

        // Credit the destination; records are created on first receipt
        for line in &movement.lines {
            inventory::provision(txn, to_store_id, line.product_id, line.quantity)?;
        }

        movement.status = MovementStatus::Completed;
        self.storage().put_movement(txn, &movement)?;

        // Mirrored import note at the destination, credited to the approver
        let import_id = self.storage().next_movement_id(txn)?;
        let import = StockMovement {
            id: import_id,
            order_id: None,
            from_store_id: movement.from_store_id,
            to_store_id: Some(to_store_id),
            creater_id: approver_id,
            total_quantity: movement.total_quantity,
            status: MovementStatus::Completed,
            movement_type: MovementType::Import,
            note: movement.note.clone(),
            lines: movement.lines.clone(),
            created_at: now_millis(),
        };
        self.storage().put_movement(txn, &import)?;

        Ok(movement)
    }

    /// Cancel a pending transfer and return the reserved stock to the
    /// source store
    pub fn cancel_transfer(&self, movement_id: i64) -> EngineResult<StockMovement> {
        let _gate = self.write_guard()?;
        let txn = self.storage().begin_write()?;

        let Some(mut movement) = self.storage().get_movement_txn(&txn, movement_id)? else {
            return Err(EngineError::MovementNotFound(movement_id));
        };
        if movement.movement_type != MovementType::Export
            || movement.status != MovementStatus::Pending
        {
            return Err(EngineError::InvalidMovementState(format!(
                "movement {} is {:?}/{:?}, expected EXPORT/PENDING",
                movement_id, movement.movement_type, movement.status
            )));
        }

        for line in &movement.lines {
            inventory::release(&txn, movement.from_store_id, line.product_id, line.quantity)?;
        }
        movement.status = MovementStatus::Cancelled;
        self.storage().put_movement(&txn, &movement)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(movement_id, "Transfer cancelled");
        Ok(movement)
    }
}
