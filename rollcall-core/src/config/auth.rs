//! Bearer token configuration.

#[derive(Debug, Clone)]
pub struct AuthConfig {
    secret: Box<[u8]>,
    /// Maximum token age in seconds.
    pub token_ttl_secs: i64,
}

impl AuthConfig {
    pub fn new(secret: impl Into<Box<[u8]>>, token_ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_secs,
        }
    }

    /// Get the secret key bytes for HMAC signing.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }
}
