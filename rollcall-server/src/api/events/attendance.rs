use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use rollcall_core::admission::{JoinEvent, LeaveEvent};
use rollcall_sdk::objects::AttendanceResponse;
use uuid::Uuid;

use super::{EventsApiError, to_response};
use crate::api::extractors::AuthUser;
use crate::state::AppState;

/// `POST /{event_id}/join`
///
/// The client's view of `attendeesCount` plays no part here: the seat is
/// granted or refused by the admission controller alone.
pub(super) async fn join_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, EventsApiError> {
    let event = state
        .admission
        .process(JoinEvent {
            event_id,
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(AttendanceResponse {
        message: "Joined".to_string(),
        event: to_response(&state, &event).await?,
    }))
}

/// `POST /{event_id}/leave`
pub(super) async fn leave_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, EventsApiError> {
    let event = state
        .admission
        .process(LeaveEvent {
            event_id,
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(AttendanceResponse {
        message: "Left".to_string(),
        event: to_response(&state, &event).await?,
    }))
}
