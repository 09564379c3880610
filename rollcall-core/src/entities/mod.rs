//! Domain records and their Postgres commands.
//!
//! [`Event`] and [`Account`] are the domain values every store hands out.
//! The `*_records` modules hold the row types and `kanau` processor
//! commands used by the Postgres backend.

pub mod account_records;
pub mod event_records;

use crate::roster::{Roster, RosterError};
use rollcall_sdk::objects::{EventCreator, EventResponse, UserResponse};
use time::OffsetDateTime;
use uuid::Uuid;

/// Descriptive fields of an event. Nothing here takes part in admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub title: String,
    pub description: Option<String>,
    pub date: OffsetDateTime,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub details: EventDetails,
    pub creator: Uuid,
    pub roster: Roster,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Input for creating an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub details: EventDetails,
    pub capacity: u32,
    pub creator: Uuid,
}

/// A creator's edit. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<OffsetDateTime>,
    pub location: Option<String>,
    pub capacity: Option<u32>,
}

impl EventPatch {
    /// Apply the patch in place. On error `event` is unchanged.
    pub fn apply(&self, event: &mut Event, now: OffsetDateTime) -> Result<(), RosterError> {
        if let Some(capacity) = self.capacity {
            event.roster.try_set_capacity(capacity)?;
        }
        if let Some(title) = &self.title {
            event.details.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.details.description = Some(description.clone());
        }
        if let Some(date) = self.date {
            event.details.date = date;
        }
        if let Some(location) = &self.location {
            event.details.location = Some(location.clone());
        }
        event.updated_at = now;
        Ok(())
    }
}

impl Event {
    /// The client view, with the creator's display name resolved by the
    /// caller.
    pub fn to_response(&self, creator_name: Option<String>) -> EventResponse {
        EventResponse {
            id: self.id,
            title: self.details.title.clone(),
            description: self.details.description.clone(),
            date: self.details.date,
            location: self.details.location.clone(),
            capacity: self.roster.capacity(),
            creator: EventCreator {
                id: self.creator,
                name: creator_name,
            },
            attendees: self.roster.attendees().to_vec(),
            attendees_count: self.roster.count(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A registered user. `email` is stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl From<&Account> for UserResponse {
    fn from(account: &Account) -> Self {
        UserResponse {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
        }
    }
}
