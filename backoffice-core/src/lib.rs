//! Back-Office Core - 零售后台订单履约引擎
//!
//! # 架构概述
//!
//! The order-fulfillment transaction engine behind the retail back office:
//!
//! - **库存** (`engine::inventory`): atomic per-(store, product) stock counters
//! - **金额计算** (`engine::money`): discount/payment totals on `rust_decimal`
//! - **收支台账** (`engine::ledger`): THU/CHI receipt notes + running cash/bank totals
//! - **订单协调** (`engine::manager`): create/cancel orders, payments, status updates
//! - **调拨流程** (`engine::transfer`): two-phase inter-store stock transfers
//!
//! # 模块结构
//!
//! ```text
//! backoffice-core/src/
//! ├── core/          # 配置
//! ├── common/        # 日志
//! ├── services/      # 只读协作方: 商品目录、门店注册表、客户目录
//! └── engine/        # 存储层 + 履约引擎
//! ```
//!
//! Every mutating operation runs inside a single redb write transaction;
//! dropping the transaction without commit rolls the whole operation back.

pub mod common;
pub mod core;
pub mod engine;
pub mod services;

// Re-export 公共类型
pub use crate::common::logger::{init_logger, init_logger_with_file};
pub use crate::core::Config;
pub use crate::engine::{
    CreateOrderOutcome, EngineError, EngineResult, EngineStorage, FulfillmentManager,
};
pub use crate::services::{
    Catalog, CustomerDirectory, InMemoryCatalog, InMemoryDirectory, InMemoryStoreRegistry,
    StoreRegistry,
};
