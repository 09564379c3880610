//! Account endpoints.
//!
//! - `POST /signup` – register and receive a token
//! - `POST /login`  – exchange credentials for a token

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use rollcall_core::entities::{Account, NewAccount};
use rollcall_core::password::{PasswordError, hash_password, verify_password};
use rollcall_core::store::StoreError;
use rollcall_sdk::objects::{AuthResponse, LoginRequest, SignupRequest, UserResponse};
use rollcall_sdk::token::BearerToken;

use super::message;
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

#[derive(Debug, thiserror::Error)]
enum AuthApiError {
    #[error("missing required fields")]
    MissingFields,
    #[error("email already registered")]
    UserExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Hash(#[from] PasswordError),
    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        match self {
            AuthApiError::MissingFields => {
                message(StatusCode::BAD_REQUEST, "Missing required fields")
            }
            AuthApiError::UserExists => message(StatusCode::BAD_REQUEST, "User already exists"),
            AuthApiError::InvalidCredentials => {
                message(StatusCode::BAD_REQUEST, "Invalid credentials")
            }
            e @ (AuthApiError::Hash(_) | AuthApiError::Join(_) | AuthApiError::Store(_)) => {
                tracing::error!(error = %e, "Auth API error");
                message(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

/// Emails are matched case-insensitively.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn issue_for(state: &AppState, account: &Account) -> AuthResponse {
    let auth = state.config.auth.read().await;
    let token = BearerToken::issue(account.id, auth.secret_bytes());
    AuthResponse {
        token: token.to_string(),
        user: UserResponse::from(account),
    }
}

/// `POST /signup`
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AuthApiError> {
    let name = payload.name.trim();
    let email = normalize_email(&payload.email);
    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(AuthApiError::MissingFields);
    }

    // Argon2 blocks for tens of milliseconds; keep it off the async workers.
    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

    let account = state
        .accounts
        .insert(NewAccount {
            name: name.to_string(),
            email,
            password_hash,
        })
        .await?
        .ok_or(AuthApiError::UserExists)?;

    tracing::info!(account_id = %account.id, "Account created");
    Ok(Json(issue_for(&state, &account).await))
}

/// `POST /login`
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthApiError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(AuthApiError::InvalidCredentials);
    }

    let account = state
        .accounts
        .find_by_email(&email)
        .await?
        .ok_or(AuthApiError::InvalidCredentials)?;

    let password = payload.password;
    let phc = account.password_hash.clone();
    let verified =
        tokio::task::spawn_blocking(move || verify_password(&password, &phc)).await?;
    if !verified {
        return Err(AuthApiError::InvalidCredentials);
    }

    Ok(Json(issue_for(&state, &account).await))
}
