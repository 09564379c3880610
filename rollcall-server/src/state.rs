//! Application state shared across all request handlers.

use rollcall_core::admission::AdmissionController;
use rollcall_core::config::SharedConfig;
use rollcall_core::framework::DatabaseProcessor;
use rollcall_core::store::{AccountStore, EventStore, MemoryAccountStore, MemoryEventStore};
use sqlx::PgPool;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventStore>,
    pub accounts: Arc<dyn AccountStore>,
    /// Join/leave over the same `events` store.
    pub admission: AdmissionController,
    /// Runtime configuration (the `auth` section can be reloaded via SIGHUP).
    pub config: SharedConfig,
}

impl AppState {
    pub fn new(
        events: Arc<dyn EventStore>,
        accounts: Arc<dyn AccountStore>,
        config: SharedConfig,
    ) -> Self {
        Self {
            admission: AdmissionController::new(events.clone()),
            events,
            accounts,
            config,
        }
    }

    /// State backed by Postgres.
    pub fn postgres(pool: PgPool, config: SharedConfig) -> Self {
        let db = Arc::new(DatabaseProcessor { pool });
        Self::new(db.clone(), db, config)
    }

    /// State backed by process memory.
    pub fn in_memory(config: SharedConfig) -> Self {
        Self::new(
            Arc::new(MemoryEventStore::new()),
            Arc::new(MemoryAccountStore::new()),
            config,
        )
    }
}
