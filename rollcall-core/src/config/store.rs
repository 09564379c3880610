//! Store backend selection. Read once at startup; not reloadable.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Postgres via `DATABASE_URL`.
    Postgres,
    /// Process memory. Data is lost on restart.
    Memory,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub max_connections: u32,
}
