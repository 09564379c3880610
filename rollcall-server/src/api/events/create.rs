use axum::{Json, extract::State, response::IntoResponse};
use rollcall_core::entities::{EventDetails, NewEvent};
use rollcall_sdk::objects::CreateEventRequest;

use super::{EventsApiError, parse_capacity, to_response};
use crate::api::extractors::AuthUser;
use crate::state::AppState;

/// Blank optional text is stored as absent.
pub(super) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `POST /`: create an event owned by the caller, with an empty roster.
pub(super) async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, EventsApiError> {
    let title = payload.title.trim();
    let (Some(date), Some(capacity)) = (payload.date, payload.capacity) else {
        return Err(EventsApiError::MissingFields);
    };
    if title.is_empty() {
        return Err(EventsApiError::MissingFields);
    }
    let capacity = parse_capacity(capacity)?;

    let event = state
        .events
        .insert(NewEvent {
            details: EventDetails {
                title: title.to_string(),
                description: non_blank(payload.description),
                date,
                location: non_blank(payload.location),
            },
            capacity,
            creator: user.user_id,
        })
        .await?;

    tracing::info!(event_id = %event.id, creator = %user.user_id, capacity, "Event created");
    Ok(Json(to_response(&state, &event).await?))
}
