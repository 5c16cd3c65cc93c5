//! Cash/Bank Ledger Models (receipt notes and running totals)

use serde::{Deserialize, Serialize};

use super::order::PaymentMethod;

/// Entry direction: THU is income, CHI is expense
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    Thu,
    Chi,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    #[default]
    Completed,
    Cancelled,
}

/// A receipt note posted against the cash/bank ledger.
///
/// One entry exists per payment instrument on an order, plus any ad-hoc
/// income/expense notes. Cancellation flips `status` and reverses the
/// entry's effect on [`AggregateLedger`]; entries are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    pub store_id: i64,
    pub creater_id: i64,
    /// Amount in currency unit
    pub total_amount: f64,
    pub method: PaymentMethod,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Free-form counterparty label (customer or supplier name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    pub created_at: i64,
}

/// Process-wide running totals. Exactly one instance exists; it is only
/// ever read or written through the ledger component.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AggregateLedger {
    pub total_income: f64,
    pub total_expense: f64,
    pub cash_balance: f64,
    pub bank_balance: f64,
}
