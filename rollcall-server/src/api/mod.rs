//! HTTP API, nested under `/api`.
//!
//! - `/auth/*`   – signup and login ([`auth`])
//! - `/events/*` – event CRUD plus join/leave ([`events`])
//!
//! Every failure body is `{ "message": "..." }`.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rollcall_sdk::objects::MessageResponse;

use crate::state::AppState;

mod auth;
mod events;
mod extractors;


/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/events", events::router())
}

/// A `{ "message": ... }` response with the given status.
fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(MessageResponse::new(message))).into_response()
}
