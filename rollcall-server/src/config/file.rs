//! TOML file configuration structures.
//!
//! These structs directly map to the `rollcall-config.toml` file format.

use rollcall_core::config::StoreBackend;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:5000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 5000))
}

/// Bearer token section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC key for bearer tokens. Left empty, a random one is generated and
    /// written back to the file.
    #[serde(default)]
    pub token_secret: String,
    /// How long an issued token stays valid, in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

/// Seven days.
fn default_token_ttl_secs() -> i64 {
    7 * 24 * 60 * 60
}

/// Storage section. Only read at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    /// Postgres pool size. Ignored by the memory backend.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Postgres
}

fn default_max_connections() -> u32 {
    10
}

impl FileConfig {
    pub fn has_token_secret(&self) -> bool {
        !self.auth.token_secret.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[auth]
token_secret = "test-secret"
token_ttl_secs = 3600

[store]
backend = "memory"
max_connections = 4
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.max_connections, 4);
        assert!(config.has_token_secret());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen, default_listen_addr());
        assert_eq!(config.auth.token_ttl_secs, 604_800);
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(config.store.max_connections, 10);
        assert!(!config.has_token_secret());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let toml_str = r#"
[store]
backend = "redis"
"#;
        assert!(toml::from_str::<FileConfig>(toml_str).is_err());
    }
}
