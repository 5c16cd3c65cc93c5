//! Cash/Bank Ledger
//!
//! Posts receipt notes (THU income / CHI expense) and maintains the
//! aggregate totals singleton. Entry creation and the aggregate update are
//! always part of the caller's write transaction, so the running totals can
//! never drift from the sum of non-cancelled entry effects: the aggregate
//! row is read-modified-written only while the single write transaction is
//! held.

use redb::WriteTransaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{EntryStatus, EntryType, LedgerEntry, PaymentMethod};
use shared::util::now_millis;

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::money::{to_decimal, to_f64};
use crate::engine::storage::EngineStorage;

/// Fields for posting a single ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEntry {
    pub order_id: Option<i64>,
    pub store_id: i64,
    pub creater_id: i64,
    pub amount: f64,
    pub method: PaymentMethod,
    pub entry_type: EntryType,
    pub note: Option<String>,
    pub counterparty: Option<String>,
}

/// Create a `Completed` entry and apply its effect to the aggregate totals
pub fn post(
    storage: &EngineStorage,
    txn: &WriteTransaction,
    input: PostEntry,
) -> EngineResult<LedgerEntry> {
    let id = storage.next_entry_id(txn)?;
    let entry = LedgerEntry {
        id,
        order_id: input.order_id,
        store_id: input.store_id,
        creater_id: input.creater_id,
        total_amount: input.amount,
        method: input.method,
        entry_type: input.entry_type,
        status: EntryStatus::Completed,
        note: input.note,
        counterparty: input.counterparty,
        created_at: now_millis(),
    };
    storage.put_entry(txn, &entry)?;
    apply_delta(storage, txn, &entry, false)?;
    tracing::debug!(
        entry_id = entry.id,
        order_id = ?entry.order_id,
        amount = entry.total_amount,
        entry_type = ?entry.entry_type,
        "Ledger entry posted"
    );
    Ok(entry)
}

/// Cancel an entry and apply the exact inverse delta to the aggregate.
///
/// Idempotent: reversing an already-cancelled entry is a no-op, so
/// cancellation paths may retry safely without double-reversing totals.
pub fn reverse(
    storage: &EngineStorage,
    txn: &WriteTransaction,
    entry_id: i64,
) -> EngineResult<LedgerEntry> {
    let Some(mut entry) = storage.get_entry_txn(txn, entry_id)? else {
        return Err(EngineError::EntryNotFound(entry_id));
    };
    if entry.status == EntryStatus::Cancelled {
        return Ok(entry);
    }
    entry.status = EntryStatus::Cancelled;
    storage.put_entry(txn, &entry)?;
    apply_delta(storage, txn, &entry, true)?;
    tracing::debug!(entry_id = entry.id, "Ledger entry reversed");
    Ok(entry)
}

/// Apply (or undo) one entry's effect on the aggregate singleton
fn apply_delta(
    storage: &EngineStorage,
    txn: &WriteTransaction,
    entry: &LedgerEntry,
    undo: bool,
) -> EngineResult<()> {
    let mut aggregate = storage.get_aggregate_txn(txn)?;
    let amount = to_decimal(entry.total_amount);
    let signed = if undo { -amount } else { amount };

    match entry.entry_type {
        EntryType::Thu => {
            aggregate.total_income = to_f64(to_decimal(aggregate.total_income) + signed);
            apply_balance(&mut aggregate, entry.method, signed);
        }
        EntryType::Chi => {
            aggregate.total_expense = to_f64(to_decimal(aggregate.total_expense) + signed);
            apply_balance(&mut aggregate, entry.method, -signed);
        }
    }

    storage.put_aggregate(txn, &aggregate)?;
    Ok(())
}

fn apply_balance(
    aggregate: &mut shared::models::AggregateLedger,
    method: PaymentMethod,
    delta: Decimal,
) {
    match method {
        PaymentMethod::Cash => {
            aggregate.cash_balance = to_f64(to_decimal(aggregate.cash_balance) + delta);
        }
        PaymentMethod::Bank => {
            aggregate.bank_balance = to_f64(to_decimal(aggregate.bank_balance) + delta);
        }
    }
}
