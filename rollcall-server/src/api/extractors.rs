//! Bearer token authentication.
//!
//! ```text
//! Authorization: Bearer {user_uuid}.{issued_at}.{base64_signature}
//! ```
//!
//! Token parsing and HMAC checks live in [`rollcall_sdk::token`]. On top of
//! that the extractor requires the account to still exist.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use rollcall_core::store::StoreError;
use rollcall_sdk::token::{BearerToken, TokenError};
use uuid::Uuid;

use super::message;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthUserError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),
    #[error("account {0} no longer exists")]
    UnknownAccount(Uuid),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AuthUserError {
    fn into_response(self) -> Response {
        match self {
            AuthUserError::Store(e) => {
                tracing::error!(error = %e, "Account lookup failed during authentication");
                message(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
            other => {
                tracing::debug!(reason = %other, "Rejected unauthenticated request");
                message(StatusCode::UNAUTHORIZED, "Unauthenticated")
            }
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthUserError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthUserError::MissingHeader)?
            .to_str()
            .map_err(|_| TokenError::InvalidFormat)?;

        let token = BearerToken::from_authorization_header(header_value)?;

        let auth = state.config.auth.read().await;
        let user_id = token.verify(auth.secret_bytes(), auth.token_ttl_secs)?;
        drop(auth);

        state
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or(AuthUserError::UnknownAccount(user_id))?;

        Ok(AuthUser { user_id })
    }
}
