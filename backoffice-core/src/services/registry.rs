//! Store registry collaborator

use parking_lot::RwLock;
use shared::models::Store;
use std::collections::HashMap;

/// Read-only store lookup by id
pub trait StoreRegistry: Send + Sync {
    fn store(&self, store_id: i64) -> Option<Store>;
}

/// In-memory store registry backed by a RwLock'd map
#[derive(Default)]
pub struct InMemoryStoreRegistry {
    stores: RwLock<HashMap<i64, Store>>,
}

impl InMemoryStoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a store
    pub fn insert(&self, store: Store) {
        self.stores.write().insert(store.id, store);
    }
}

impl StoreRegistry for InMemoryStoreRegistry {
    fn store(&self, store_id: i64) -> Option<Store> {
        self.stores
            .read()
            .get(&store_id)
            .filter(|s| s.is_active)
            .cloned()
    }
}
