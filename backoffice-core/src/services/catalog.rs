//! Product catalog collaborator

use parking_lot::RwLock;
use shared::models::Product;
use std::collections::HashMap;

/// Read-only product lookup by id.
///
/// A missing or inactive product is a domain error for the engine, never a
/// zero-price fallback.
pub trait Catalog: Send + Sync {
    fn product(&self, product_id: i64) -> Option<Product>;
}

/// In-memory catalog backed by a RwLock'd map
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<i64, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product
    pub fn insert(&self, product: Product) {
        self.products.write().insert(product.id, product);
    }
}

impl Catalog for InMemoryCatalog {
    fn product(&self, product_id: i64) -> Option<Product> {
        self.products
            .read()
            .get(&product_id)
            .filter(|p| p.is_active)
            .cloned()
    }
}
