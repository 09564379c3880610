use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use rollcall_sdk::objects::MyEventsResponse;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{EventsApiError, to_response, to_responses};
use crate::api::extractors::AuthUser;
use crate::state::AppState;

/// `GET /`: events dated now or later, ascending by date.
pub(super) async fn list_upcoming(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, EventsApiError> {
    let events = state.events.list_upcoming(OffsetDateTime::now_utc()).await?;
    Ok(Json(to_responses(&state, &events).await?))
}

/// `GET /mine`
pub(super) async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, EventsApiError> {
    let created = state.events.list_created_by(user.user_id).await?;
    let attending = state.events.list_attended_by(user.user_id).await?;
    Ok(Json(MyEventsResponse {
        created: to_responses(&state, &created).await?,
        attending: to_responses(&state, &attending).await?,
    }))
}

/// `GET /{event_id}`
pub(super) async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, EventsApiError> {
    let event = state
        .events
        .get(event_id)
        .await?
        .ok_or(EventsApiError::EventNotFound)?;
    Ok(Json(to_response(&state, &event).await?))
}
