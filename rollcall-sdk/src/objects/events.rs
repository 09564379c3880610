//! Event bodies.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// An event as exposed to clients.
///
/// `attendeesCount` and `capacity` let a client grey out its join button,
/// but the server decides admission on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub location: Option<String>,
    pub capacity: u32,
    pub creator: EventCreator,
    pub attendees: Vec<Uuid>,
    pub attendees_count: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Who created an event. `name` is `None` when the account is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCreator {
    pub id: Uuid,
    pub name: Option<String>,
}

/// `POST /api/events`.
///
/// `title`, `date` and `capacity` are required; the server checks presence
/// rather than relying on deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
}

/// `PUT /api/events/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
}

/// `GET /api/events/mine`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MyEventsResponse {
    pub created: Vec<EventResponse>,
    pub attending: Vec<EventResponse>,
}

/// Successful join or leave: `{ "message": "Joined", "event": {...} }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceResponse {
    pub message: String,
    pub event: EventResponse,
}

/// `POST /api/events/generate-description`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateDescriptionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateDescriptionResponse {
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_response_uses_camel_case() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let event = EventResponse {
            id: Uuid::nil(),
            title: "Meetup".to_string(),
            description: None,
            date: now,
            location: None,
            capacity: 5,
            creator: EventCreator {
                id: Uuid::nil(),
                name: Some("Alice".to_string()),
            },
            attendees: vec![],
            attendees_count: 0,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["attendeesCount"], 0);
        assert_eq!(json["capacity"], 5);
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["creator"]["name"], "Alice");
    }

    #[test]
    fn create_request_tolerates_missing_fields() {
        let req: CreateEventRequest = serde_json::from_str(r#"{"title":"Meetup"}"#).unwrap();
        assert_eq!(req.title, "Meetup");
        assert!(req.date.is_none());
        assert!(req.capacity.is_none());

        let req: CreateEventRequest = serde_json::from_str(
            r#"{"title":"Meetup","date":"2030-01-01T18:00:00Z","capacity":5}"#,
        )
        .unwrap();
        assert_eq!(req.capacity, Some(5));
        assert_eq!(req.date.map(|d| d.year()), Some(2030));
    }
}
