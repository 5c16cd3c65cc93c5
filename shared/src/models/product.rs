//! Product Model (read-only catalog view)

use serde::{Deserialize, Serialize};

/// Catalog product as seen by the engine. The catalog itself is owned by
/// the CRUD layer; the engine only resolves ids through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
