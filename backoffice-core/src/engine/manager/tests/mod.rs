//! Flow tests for the fulfillment manager
//!
//! Shared fixtures live here; the scenarios are split by concern.

use super::*;
use crate::services::{InMemoryCatalog, InMemoryDirectory, InMemoryStoreRegistry};
use shared::models::{OrderItemInput, PaymentMethod, Product, Store};

mod test_transfers;

pub(crate) const STORE_CENTRAL: i64 = 1;
pub(crate) const STORE_BRANCH: i64 = 2;
pub(crate) const CUSTOMER: i64 = 500;

pub(crate) fn create_test_manager() -> FulfillmentManager {
    let catalog = Arc::new(InMemoryCatalog::new());
    for (id, name) in [(1, "Keyboard"), (2, "Mouse"), (3, "Monitor")] {
        catalog.insert(Product {
            id,
            name: name.to_string(),
            sku: format!("SKU-{:04}", id),
            category_id: None,
            is_active: true,
        });
    }

    let stores = Arc::new(InMemoryStoreRegistry::new());
    stores.insert(Store {
        id: STORE_CENTRAL,
        name: "Central".to_string(),
        owner_id: 1,
        address: None,
        is_active: true,
    });
    stores.insert(Store {
        id: STORE_BRANCH,
        name: "Branch".to_string(),
        owner_id: 1,
        address: None,
        is_active: true,
    });

    let customers = Arc::new(InMemoryDirectory::new());
    customers.insert(CUSTOMER);

    FulfillmentManager::open_in_memory(catalog, stores, customers).unwrap()
}

/// Manager with stock provisioned at the central store
pub(crate) fn seeded_manager() -> FulfillmentManager {
    let manager = create_test_manager();
    manager.provision_stock(STORE_CENTRAL, 1, 100).unwrap();
    manager.provision_stock(STORE_CENTRAL, 2, 50).unwrap();
    manager.provision_stock(STORE_CENTRAL, 3, 10).unwrap();
    manager
}

pub(crate) fn line(product_id: i64, quantity: i32, unit_price: f64) -> OrderItemInput {
    OrderItemInput {
        product_id,
        quantity,
        unit_price,
    }
}

pub(crate) fn cash(amount: f64) -> PaymentInput {
    PaymentInput {
        method: PaymentMethod::Cash,
        amount,
        note: None,
    }
}

pub(crate) fn bank(amount: f64) -> PaymentInput {
    PaymentInput {
        method: PaymentMethod::Bank,
        amount,
        note: None,
    }
}

pub(crate) fn order_request(
    items: Vec<OrderItemInput>,
    discount_percent: Option<f64>,
    payments: Vec<PaymentInput>,
) -> CreateOrderRequest {
    CreateOrderRequest {
        store_id: STORE_CENTRAL,
        customer_id: Some(CUSTOMER),
        items,
        discount_percent,
        payments,
    }
}
