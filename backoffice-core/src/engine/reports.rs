//! Read-only report queries
//!
//! Consumes only committed order and ledger state through redb read
//! transactions. Never called from inside a write transaction.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{AggregateLedger, EntryStatus, EntryType};
use std::collections::BTreeMap;

use crate::engine::error::EngineResult;
use crate::engine::manager::FulfillmentManager;
use crate::engine::money::{to_decimal, to_f64};

/// Income total for one UTC calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    /// `YYYY-MM-DD`
    pub date: String,
    pub total: f64,
}

impl FulfillmentManager {
    /// Snapshot of the running totals singleton
    pub fn aggregate(&self) -> EngineResult<AggregateLedger> {
        Ok(self.storage().get_aggregate()?)
    }

    /// Total non-cancelled income, optionally restricted to one store
    pub fn revenue_total(&self, store_id: Option<i64>) -> EngineResult<f64> {
        let total = self
            .storage()
            .get_all_entries()?
            .iter()
            .filter(|e| e.status == EntryStatus::Completed && e.entry_type == EntryType::Thu)
            .filter(|e| store_id.map_or(true, |s| e.store_id == s))
            .fold(Decimal::ZERO, |acc, e| acc + to_decimal(e.total_amount));
        Ok(to_f64(total))
    }

    /// Non-cancelled income bucketed by UTC calendar day, ascending
    pub fn revenue_by_day(&self, store_id: Option<i64>) -> EngineResult<Vec<DailyRevenue>> {
        let mut buckets: BTreeMap<String, Decimal> = BTreeMap::new();
        for entry in self
            .storage()
            .get_all_entries()?
            .iter()
            .filter(|e| e.status == EntryStatus::Completed && e.entry_type == EntryType::Thu)
            .filter(|e| store_id.map_or(true, |s| e.store_id == s))
        {
            let day = Utc
                .timestamp_millis_opt(entry.created_at)
                .single()
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "invalid".to_string());
            *buckets.entry(day).or_insert(Decimal::ZERO) += to_decimal(entry.total_amount);
        }
        Ok(buckets
            .into_iter()
            .map(|(date, total)| DailyRevenue {
                date,
                total: to_f64(total),
            })
            .collect())
    }
}
