//! Event endpoints.
//!
//! # Endpoints
//!
//! - `GET    /`                     – upcoming events, soonest first
//! - `POST   /`                     – create an event (auth)
//! - `GET    /mine`                 – events the caller created or attends (auth)
//! - `POST   /generate-description` – fill the description template (auth)
//! - `GET    /{event_id}`           – a single event
//! - `PUT    /{event_id}`           – edit, creator only (auth)
//! - `DELETE /{event_id}`           – delete, creator only (auth)
//! - `POST   /{event_id}/join`      – reserve a seat (auth)
//! - `POST   /{event_id}/leave`     – release a seat (auth)

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rollcall_core::admission::AdmissionError;
use rollcall_core::entities::Event;
use rollcall_core::store::StoreError;
use rollcall_sdk::objects::EventResponse;
use uuid::Uuid;

use super::message;
use crate::state::AppState;

mod attendance;
mod create;
mod describe;
mod list;
mod update;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_upcoming).post(create::create_event))
        .route("/mine", get(list::list_mine))
        .route(
            "/generate-description",
            post(describe::generate_description),
        )
        .route(
            "/{event_id}",
            get(list::get_event)
                .put(update::update_event)
                .delete(update::delete_event),
        )
        .route("/{event_id}/join", post(attendance::join_event))
        .route("/{event_id}/leave", post(attendance::leave_event))
}

/// Upper bound shared by both backends (Postgres stores an `integer`).
const MAX_CAPACITY: i64 = i32::MAX as i64;

/// Accept a client-supplied capacity only if it is a positive integer that
/// every backend can store.
fn parse_capacity(raw: i64) -> Result<u32, EventsApiError> {
    if !(1..=MAX_CAPACITY).contains(&raw) {
        return Err(EventsApiError::InvalidCapacity);
    }
    u32::try_from(raw).map_err(|_| EventsApiError::InvalidCapacity)
}

/// Client views of `events`, each labelled with its creator's name.
async fn to_responses(
    state: &AppState,
    events: &[Event],
) -> Result<Vec<EventResponse>, EventsApiError> {
    let mut creators: Vec<Uuid> = events.iter().map(|e| e.creator).collect();
    creators.sort_unstable();
    creators.dedup();
    let names = state.accounts.names_by_ids(&creators).await?;
    Ok(events
        .iter()
        .map(|e| e.to_response(names.get(&e.creator).cloned()))
        .collect())
}

async fn to_response(state: &AppState, event: &Event) -> Result<EventResponse, EventsApiError> {
    let name = state
        .accounts
        .find_by_id(event.creator)
        .await?
        .map(|account| account.name);
    Ok(event.to_response(name))
}

/// Errors that can occur in event handlers.
#[derive(Debug)]
enum EventsApiError {
    /// Title, date or capacity absent on create.
    MissingFields,
    InvalidCapacity,
    /// Lookup by id found nothing.
    EventNotFound,
    /// Edit or delete target does not exist.
    NotFound,
    /// Caller is not the creator.
    Forbidden,
    /// An edit would leave more attendees than seats.
    CapacityBelowAttendance,
    /// The conditional edit failed but a re-read shows no reason.
    EditConflict,
    Admission(AdmissionError),
    Store(StoreError),
}

impl From<StoreError> for EventsApiError {
    fn from(e: StoreError) -> Self {
        EventsApiError::Store(e)
    }
}

impl From<AdmissionError> for EventsApiError {
    fn from(e: AdmissionError) -> Self {
        match e {
            AdmissionError::Store(e) => EventsApiError::Store(e),
            other => EventsApiError::Admission(other),
        }
    }
}

impl IntoResponse for EventsApiError {
    fn into_response(self) -> Response {
        match self {
            EventsApiError::MissingFields => {
                message(StatusCode::BAD_REQUEST, "Missing required fields")
            }
            EventsApiError::InvalidCapacity => message(
                StatusCode::BAD_REQUEST,
                "Capacity must be a positive integer",
            ),
            EventsApiError::EventNotFound => message(StatusCode::NOT_FOUND, "Event not found"),
            EventsApiError::NotFound => message(StatusCode::NOT_FOUND, "Not found"),
            EventsApiError::Forbidden => message(StatusCode::FORBIDDEN, "Forbidden"),
            EventsApiError::CapacityBelowAttendance => message(
                StatusCode::BAD_REQUEST,
                "Capacity below current attendance",
            ),
            EventsApiError::EditConflict => {
                message(StatusCode::CONFLICT, "Event changed, please retry")
            }
            EventsApiError::Admission(e) => match e {
                AdmissionError::EventNotFound => {
                    message(StatusCode::NOT_FOUND, "Event not found")
                }
                AdmissionError::AlreadyJoined => message(StatusCode::BAD_REQUEST, "Already joined"),
                AdmissionError::EventFull => message(StatusCode::BAD_REQUEST, "Event full"),
                AdmissionError::NotAttending => message(StatusCode::BAD_REQUEST, "Not attending"),
                AdmissionError::Unknown => message(StatusCode::BAD_REQUEST, "Unable to join"),
                AdmissionError::Store(e) => EventsApiError::Store(e).into_response(),
            },
            EventsApiError::Store(e) => {
                tracing::error!(error = %e, "Events API store error");
                message(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}
