//! Configuration types for rollcall.
//!
//! These types represent the validated runtime configuration used by the
//! server. The actual config loading/parsing is handled by the server crate.

mod auth;
mod server;
mod store;

pub use auth::AuthConfig;
pub use server::ServerConfig;
pub use store::{StoreBackend, StoreConfig};

use std::sync::Arc;
use tokio::sync::RwLock;

/// Configuration that can change while the server runs.
///
/// Only the `auth` section is reloadable; [`ServerConfig`] and
/// [`StoreConfig`] are bound once at startup.
#[derive(Clone)]
pub struct SharedConfig {
    /// Token signing secret and lifetime.
    pub auth: Arc<RwLock<AuthConfig>>,
}

impl SharedConfig {
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            auth: Arc::new(RwLock::new(auth)),
        }
    }
}
