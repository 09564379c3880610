//! Bearer tokens issued on signup/login.
//!
//! The wire format is:
//!
//! ```text
//! Authorization: Bearer {user_uuid}.{issued_at}.{base64_signature}
//! ```
//!
//! where the signature is `HMAC-SHA256("{user_uuid}.{issued_at}", secret)`
//! encoded as RFC 4648 base64 without padding.

use std::fmt;
use uuid::Uuid;

/// Scheme prefix of the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// How far in the future `issued_at` may lie before the token is refused.
pub const MAX_CLOCK_SKEW: i64 = 60;

/// Errors produced by token parsing and verification.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("token expired")]
    Expired,
}

impl From<ring::error::Unspecified> for TokenError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// A parsed (not yet verified) bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken {
    pub user_id: Uuid,
    pub issued_at: i64,
    pub signature: Box<[u8]>,
}

impl BearerToken {
    /// Issue a token for `user_id` stamped with the current time.
    pub fn issue(user_id: Uuid, key: &[u8]) -> Self {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        Self::issue_at(user_id, now, key)
    }

    /// Issue a token with an explicit `issued_at`.
    pub fn issue_at(user_id: Uuid, issued_at: i64, key: &[u8]) -> Self {
        let sig = ring::hmac::sign(
            &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
            signing_input(user_id, issued_at).as_bytes(),
        );
        Self {
            user_id,
            issued_at,
            signature: sig.as_ref().to_owned().into_boxed_slice(),
        }
    }

    /// Parse `{user_uuid}.{issued_at}.{base64}`.
    ///
    /// This does **not** check the signature; call [`verify`](Self::verify).
    pub fn parse(value: &str) -> Result<Self, TokenError> {
        let mut parts = value.splitn(3, '.');
        let (Some(user), Some(issued_at), Some(sig)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::InvalidFormat);
        };
        let user_id = Uuid::parse_str(user).map_err(|_| TokenError::InvalidFormat)?;
        let issued_at: i64 = issued_at.parse().map_err(|_| TokenError::InvalidFormat)?;
        let signature = fast32::base64::RFC4648_NOPAD
            .decode_str(sig)
            .map_err(|_| TokenError::InvalidBase64)?
            .into_boxed_slice();
        Ok(Self {
            user_id,
            issued_at,
            signature,
        })
    }

    /// Parse the value of an `Authorization` header (`Bearer ...`).
    pub fn from_authorization_header(value: &str) -> Result<Self, TokenError> {
        let token = value
            .strip_prefix(BEARER_PREFIX)
            .ok_or(TokenError::InvalidFormat)?;
        Self::parse(token.trim())
    }

    /// Verify the signature and age, returning the authenticated user id.
    pub fn verify(&self, key: &[u8], max_age_secs: i64) -> Result<Uuid, TokenError> {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        self.verify_at(key, max_age_secs, now)
    }

    /// [`verify`](Self::verify) against an explicit clock.
    pub fn verify_at(&self, key: &[u8], max_age_secs: i64, now: i64) -> Result<Uuid, TokenError> {
        ring::hmac::verify(
            &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
            signing_input(self.user_id, self.issued_at).as_bytes(),
            self.signature.as_ref(),
        )?;
        if self.issued_at - now > MAX_CLOCK_SKEW {
            return Err(TokenError::InvalidFormat);
        }
        if now - self.issued_at > max_age_secs {
            return Err(TokenError::Expired);
        }
        Ok(self.user_id)
    }

    /// Format the full `Authorization` header value.
    pub fn to_header(&self) -> String {
        format!("{BEARER_PREFIX}{self}")
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.user_id,
            self.issued_at,
            fast32::base64::RFC4648_NOPAD.encode(&self.signature)
        )
    }
}

fn signing_input(user_id: Uuid, issued_at: i64) -> String {
    format!("{user_id}.{issued_at}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-secret";

    #[test]
    fn issued_token_verifies() {
        let user = Uuid::now_v7();
        let token = BearerToken::issue_at(user, 1_000, KEY);
        let parsed = BearerToken::parse(&token.to_string()).unwrap();
        assert_eq!(parsed, token);
        assert_eq!(parsed.verify_at(KEY, 3600, 1_500).unwrap(), user);
    }

    #[test]
    fn header_round_trip() {
        let token = BearerToken::issue(Uuid::now_v7(), KEY);
        let parsed = BearerToken::from_authorization_header(&token.to_header()).unwrap();
        assert_eq!(parsed, token);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = BearerToken::issue_at(Uuid::now_v7(), 1_000, KEY);
        assert!(matches!(
            token.verify_at(b"other", 3600, 1_000),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn swapped_user_is_rejected() {
        let mut token = BearerToken::issue_at(Uuid::now_v7(), 1_000, KEY);
        token.user_id = Uuid::now_v7();
        assert!(matches!(
            token.verify_at(KEY, 3600, 1_000),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn old_token_is_expired() {
        let token = BearerToken::issue_at(Uuid::now_v7(), 1_000, KEY);
        assert!(matches!(
            token.verify_at(KEY, 60, 2_000),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn malformed_tokens() {
        assert!(matches!(
            BearerToken::parse("nope"),
            Err(TokenError::InvalidFormat)
        ));
        assert!(matches!(
            BearerToken::parse(&format!("{}.abc.AAAA", Uuid::nil())),
            Err(TokenError::InvalidFormat)
        ));
        assert!(matches!(
            BearerToken::parse(&format!("{}.10.!!!", Uuid::nil())),
            Err(TokenError::InvalidBase64)
        ));
        assert!(matches!(
            BearerToken::from_authorization_header("Basic abc"),
            Err(TokenError::InvalidFormat)
        ));
    }
}
