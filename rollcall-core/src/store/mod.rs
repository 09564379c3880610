//! Persistence seams for events and accounts.
//!
//! The admission core needs exactly one capability from its event store:
//! an atomic conditional update per event ([`EventStore::add_attendee_if_admissible`]
//! and [`EventStore::remove_attendee_if_present`]). Everything else here is
//! ordinary CRUD.
//!
//! Two backends exist:
//!
//! - [`MemoryEventStore`] / [`MemoryAccountStore`]: per-event mutexes in
//!   process memory.
//! - [`DatabaseProcessor`](crate::framework::DatabaseProcessor): Postgres,
//!   one conditional statement per operation.

mod memory;
mod postgres;

pub use memory::{MemoryAccountStore, MemoryEventStore};

use crate::entities::{Account, Event, EventPatch, NewAccount, NewEvent};
use crate::roster::RosterError;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Store failures. All of them are safe for the caller to retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored record, or a record about to be stored, breaks the roster
    /// invariant.
    #[error("roster invariant violated: {0}")]
    Invariant(#[from] RosterError),
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Create an event with an empty roster.
    async fn insert(&self, new: NewEvent) -> Result<Event, StoreError>;

    async fn get(&self, event_id: Uuid) -> Result<Option<Event>, StoreError>;

    /// Events dated at or after `now`, soonest first.
    async fn list_upcoming(&self, now: OffsetDateTime) -> Result<Vec<Event>, StoreError>;

    async fn list_created_by(&self, user_id: Uuid) -> Result<Vec<Event>, StoreError>;

    async fn list_attended_by(&self, user_id: Uuid) -> Result<Vec<Event>, StoreError>;

    /// Atomically add `user_id` when they are not a member and
    /// `attendees_count < capacity`.
    ///
    /// `None` means the predicate did not hold at the moment of the attempt
    /// (or the event does not exist). The store does not say which.
    async fn add_attendee_if_admissible(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Event>, StoreError>;

    /// Atomically remove `user_id` when they are a member.
    async fn remove_attendee_if_present(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Event>, StoreError>;

    /// Atomically apply `patch` when `creator` owns the event and the new
    /// capacity is not below the current attendance.
    async fn update_if_owned(
        &self,
        event_id: Uuid,
        creator: Uuid,
        patch: EventPatch,
    ) -> Result<Option<Event>, StoreError>;

    /// Atomically delete the event when `creator` owns it.
    async fn delete_if_owned(&self, event_id: Uuid, creator: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Returns `None` when the email is already registered.
    async fn insert(&self, new: NewAccount) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Display names for the given accounts. Unknown ids are left out.
    async fn names_by_ids(
        &self,
        account_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, StoreError>;
}
