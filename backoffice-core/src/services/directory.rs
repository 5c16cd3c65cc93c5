//! Customer directory collaborator
//!
//! The identity provider authenticates; the engine only checks that a
//! customer id supplied on an order actually resolves.

use parking_lot::RwLock;
use std::collections::HashSet;

/// Read-only customer id resolution
pub trait CustomerDirectory: Send + Sync {
    fn customer_exists(&self, customer_id: i64) -> bool;
}

/// In-memory customer directory
#[derive(Default)]
pub struct InMemoryDirectory {
    customers: RwLock<HashSet<i64>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer_id: i64) {
        self.customers.write().insert(customer_id);
    }
}

impl CustomerDirectory for InMemoryDirectory {
    fn customer_exists(&self, customer_id: i64) -> bool {
        self.customers.read().contains(&customer_id)
    }
}
