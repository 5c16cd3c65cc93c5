//! Quickstart - full order lifecycle against a scratch database
//!
//! Provisions stock, sells with a split payment, posts an expense note,
//! cancels an unpaid order and runs an inter-store transfer, logging the
//! ledger as it moves.
//!
//! 运行: cargo run -p backoffice-core --example quickstart

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use backoffice_core::engine::PostEntry;
use backoffice_core::{
    Config, FulfillmentManager, InMemoryCatalog, InMemoryDirectory, InMemoryStoreRegistry,
    init_logger_with_file,
};
use shared::models::{
    CreateOrderRequest, CreateTransferRequest, EntryType, OrderItemInput, PaymentInput,
    PaymentMethod, Product, Store, TransferItemInput,
};

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    let log_dir = config.log_dir();
    init_logger_with_file(&config.log_level, config.log_json, log_dir.to_str())?;

    // Collaborators normally owned by the CRUD layer
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.insert(Product {
        id: 1,
        name: "Mechanical keyboard".to_string(),
        sku: "KB-87".to_string(),
        category_id: None,
        is_active: true,
    });
    catalog.insert(Product {
        id: 2,
        name: "Wireless mouse".to_string(),
        sku: "MS-12".to_string(),
        category_id: None,
        is_active: true,
    });

    let stores = Arc::new(InMemoryStoreRegistry::new());
    stores.insert(Store {
        id: 1,
        name: "Central".to_string(),
        owner_id: 1,
        address: None,
        is_active: true,
    });
    stores.insert(Store {
        id: 2,
        name: "Riverside".to_string(),
        owner_id: 1,
        address: None,
        is_active: true,
    });

    let customers = Arc::new(InMemoryDirectory::new());
    customers.insert(500);

    let manager = FulfillmentManager::open(config.db_path(), catalog, stores, customers)?
        .with_lock_wait(Duration::from_millis(config.lock_wait_ms));

    manager.provision_stock(1, 1, 50)?;
    manager.provision_stock(1, 2, 80)?;

    // Sell two keyboards and a mouse, 10% off, split payment
    let outcome = manager.create_order(
        CreateOrderRequest {
            store_id: 1,
            customer_id: Some(500),
            items: vec![
                OrderItemInput {
                    product_id: 1,
                    quantity: 2,
                    unit_price: 89.0,
                },
                OrderItemInput {
                    product_id: 2,
                    quantity: 1,
                    unit_price: 25.0,
                },
            ],
            discount_percent: Some(10.0),
            payments: vec![
                PaymentInput {
                    method: PaymentMethod::Cash,
                    amount: 100.0,
                    note: None,
                },
                PaymentInput {
                    method: PaymentMethod::Bank,
                    amount: 82.7,
                    note: None,
                },
            ],
        },
        7,
    )?;
    tracing::info!(
        code = %outcome.order.code,
        total = outcome.order.total_amount,
        status = ?outcome.order.order_status,
        "Order settled"
    );

    // An expense paid from the drawer
    manager.post_manual_entry(PostEntry {
        order_id: None,
        store_id: 1,
        creater_id: 7,
        amount: 40.0,
        method: PaymentMethod::Cash,
        entry_type: EntryType::Chi,
        note: Some("window cleaning".to_string()),
        counterparty: Some("CleanCo".to_string()),
    })?;

    // An unpaid order that gets cancelled; stock and ledger roll back
    let pending = manager.create_order(
        CreateOrderRequest {
            store_id: 1,
            customer_id: Some(500),
            items: vec![OrderItemInput {
                product_id: 2,
                quantity: 3,
                unit_price: 25.0,
            }],
            discount_percent: None,
            payments: vec![],
        },
        7,
    )?;
    manager.cancel_order(pending.order.id)?;

    // Restock the riverside store: reserve, then approve
    let movement = manager.create_transfer(
        CreateTransferRequest {
            from_store_id: 1,
            to_store_id: 2,
            items: vec![TransferItemInput {
                product_id: 1,
                quantity: 10,
            }],
            note: Some("opening stock".to_string()),
        },
        7,
    )?;
    manager.approve_transfer(movement.id, 8)?;
    tracing::info!(
        central = ?manager.stock_level(1, 1)?,
        riverside = ?manager.stock_level(2, 1)?,
        "Keyboard stock after transfer"
    );

    let aggregate = manager.aggregate()?;
    tracing::info!(
        income = aggregate.total_income,
        expense = aggregate.total_expense,
        cash = aggregate.cash_balance,
        bank = aggregate.bank_balance,
        "Ledger totals"
    );
    for day in manager.revenue_by_day(None)? {
        tracing::info!(date = %day.date, total = day.total, "Daily revenue");
    }

    Ok(())
}
