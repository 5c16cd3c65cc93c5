//! Store Model (read-only registry view)

use serde::{Deserialize, Serialize};

/// A physical store. Owned by the registry; the engine only resolves ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
