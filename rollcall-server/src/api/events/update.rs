//! Creator-only edit and delete.
//!
//! Both run the store's owner-scoped conditional operation first and only
//! re-read the event to explain a failure, the same two phases as join.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use rollcall_core::entities::EventPatch;
use rollcall_sdk::objects::{MessageResponse, UpdateEventRequest};
use uuid::Uuid;

use super::create::non_blank;
use super::{EventsApiError, parse_capacity, to_response};
use crate::api::extractors::AuthUser;
use crate::state::AppState;

/// `PUT /{event_id}`
pub(super) async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, EventsApiError> {
    let title = match payload.title {
        Some(title) if title.trim().is_empty() => return Err(EventsApiError::MissingFields),
        Some(title) => Some(title.trim().to_string()),
        None => None,
    };
    let capacity = payload.capacity.map(parse_capacity).transpose()?;
    let patch = EventPatch {
        title,
        description: non_blank(payload.description),
        date: payload.date,
        location: non_blank(payload.location),
        capacity,
    };

    if let Some(event) = state
        .events
        .update_if_owned(event_id, user.user_id, patch)
        .await?
    {
        return Ok(Json(to_response(&state, &event).await?));
    }

    let current = state
        .events
        .get(event_id)
        .await?
        .ok_or(EventsApiError::NotFound)?;
    if current.creator != user.user_id {
        return Err(EventsApiError::Forbidden);
    }
    match capacity {
        Some(capacity) if capacity < current.roster.count() => {
            Err(EventsApiError::CapacityBelowAttendance)
        }
        _ => {
            tracing::warn!(%event_id, "Conditional edit failed without a visible reason");
            Err(EventsApiError::EditConflict)
        }
    }
}

/// `DELETE /{event_id}`
pub(super) async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, EventsApiError> {
    if state.events.delete_if_owned(event_id, user.user_id).await? {
        tracing::info!(%event_id, "Event deleted");
        return Ok(Json(MessageResponse::new("Deleted")));
    }

    match state.events.get(event_id).await? {
        Some(event) if event.creator != user.user_id => Err(EventsApiError::Forbidden),
        _ => Err(EventsApiError::NotFound),
    }
}
