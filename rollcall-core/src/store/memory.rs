//! In-process stores.
//!
//! Each event lives in its own `Arc<Mutex<Option<Event>>>` slot. The map
//! lock is only held long enough to find or create a slot; every read and
//! write of an event happens under that event's mutex, so operations on
//! distinct events never wait on each other. Lock order is always map
//! first, then slot, and the map lock is released before a slot is locked.
//!
//! Deletion clears the slot under its mutex before unlinking it, so a
//! conditional update that raced the delete and still holds the slot sees
//! an absent event instead of resurrecting it.

use super::{AccountStore, EventStore, StoreError};
use crate::entities::{Account, Event, EventPatch, NewAccount, NewEvent};
use crate::roster::Roster;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

type Slot = Arc<Mutex<Option<Event>>>;

#[derive(Default)]
pub struct MemoryEventStore {
    slots: RwLock<HashMap<Uuid, Slot>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, event_id: Uuid) -> Option<Slot> {
        self.slots.read().await.get(&event_id).cloned()
    }

    /// Snapshot every live event matching `filter`, soonest first.
    async fn collect<F>(&self, filter: F) -> Vec<Event>
    where
        F: Fn(&Event) -> bool,
    {
        let slots: Vec<Slot> = self.slots.read().await.values().cloned().collect();
        let mut events = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(event) = slot.lock().await.as_ref() {
                if filter(event) {
                    events.push(event.clone());
                }
            }
        }
        events.sort_by_key(|e| e.details.date);
        events
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, new: NewEvent) -> Result<Event, StoreError> {
        let now = OffsetDateTime::now_utc();
        let event = Event {
            id: Uuid::now_v7(),
            details: new.details,
            creator: new.creator,
            roster: Roster::new(new.capacity)?,
            created_at: now,
            updated_at: now,
        };
        self.slots
            .write()
            .await
            .insert(event.id, Arc::new(Mutex::new(Some(event.clone()))));
        Ok(event)
    }

    async fn get(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let Some(slot) = self.slot(event_id).await else {
            return Ok(None);
        };
        let guard = slot.lock().await;
        Ok(guard.clone())
    }

    async fn list_upcoming(&self, now: OffsetDateTime) -> Result<Vec<Event>, StoreError> {
        Ok(self.collect(|e| e.details.date >= now).await)
    }

    async fn list_created_by(&self, user_id: Uuid) -> Result<Vec<Event>, StoreError> {
        Ok(self.collect(|e| e.creator == user_id).await)
    }

    async fn list_attended_by(&self, user_id: Uuid) -> Result<Vec<Event>, StoreError> {
        Ok(self.collect(|e| e.roster.contains(user_id)).await)
    }

    async fn add_attendee_if_admissible(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Event>, StoreError> {
        let Some(slot) = self.slot(event_id).await else {
            return Ok(None);
        };
        let mut guard = slot.lock().await;
        let Some(event) = guard.as_mut() else {
            return Ok(None);
        };
        if event.roster.try_add(user_id).is_err() {
            return Ok(None);
        }
        event.updated_at = OffsetDateTime::now_utc();
        Ok(Some(event.clone()))
    }

    async fn remove_attendee_if_present(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Event>, StoreError> {
        let Some(slot) = self.slot(event_id).await else {
            return Ok(None);
        };
        let mut guard = slot.lock().await;
        let Some(event) = guard.as_mut() else {
            return Ok(None);
        };
        if event.roster.try_remove(user_id).is_err() {
            return Ok(None);
        }
        event.updated_at = OffsetDateTime::now_utc();
        Ok(Some(event.clone()))
    }

    async fn update_if_owned(
        &self,
        event_id: Uuid,
        creator: Uuid,
        patch: EventPatch,
    ) -> Result<Option<Event>, StoreError> {
        let Some(slot) = self.slot(event_id).await else {
            return Ok(None);
        };
        let mut guard = slot.lock().await;
        let Some(event) = guard.as_mut() else {
            return Ok(None);
        };
        if event.creator != creator {
            return Ok(None);
        }
        if patch.apply(event, OffsetDateTime::now_utc()).is_err() {
            return Ok(None);
        }
        Ok(Some(event.clone()))
    }

    async fn delete_if_owned(&self, event_id: Uuid, creator: Uuid) -> Result<bool, StoreError> {
        let Some(slot) = self.slot(event_id).await else {
            return Ok(false);
        };
        {
            let mut guard = slot.lock().await;
            match guard.as_ref() {
                Some(event) if event.creator == creator => *guard = None,
                _ => return Ok(false),
            }
        }
        self.slots.write().await.remove(&event_id);
        Ok(true)
    }
}

#[derive(Default)]
struct AccountIndex {
    by_id: HashMap<Uuid, Account>,
    by_email: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct MemoryAccountStore {
    index: RwLock<AccountIndex>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, new: NewAccount) -> Result<Option<Account>, StoreError> {
        let mut index = self.index.write().await;
        if index.by_email.contains_key(&new.email) {
            return Ok(None);
        }
        let account = Account {
            id: Uuid::now_v7(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        index.by_email.insert(account.email.clone(), account.id);
        index.by_id.insert(account.id, account.clone());
        Ok(Some(account))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let index = self.index.read().await;
        Ok(index
            .by_email
            .get(email)
            .and_then(|id| index.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.index.read().await.by_id.get(&account_id).cloned())
    }

    async fn names_by_ids(
        &self,
        account_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, StoreError> {
        let index = self.index.read().await;
        Ok(account_ids
            .iter()
            .filter_map(|id| index.by_id.get(id).map(|a| (*id, a.name.clone())))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::EventDetails;
    use time::Duration;

    fn new_event(creator: Uuid, capacity: u32, offset: Duration) -> NewEvent {
        NewEvent {
            details: EventDetails {
                title: "Meetup".to_string(),
                description: None,
                date: OffsetDateTime::now_utc() + offset,
                location: Some("Lab".to_string()),
            },
            capacity,
            creator,
        }
    }

    #[tokio::test]
    async fn insert_rejects_zero_capacity() {
        let store = MemoryEventStore::new();
        let result = store.insert(new_event(Uuid::now_v7(), 0, Duration::hours(1))).await;
        assert!(matches!(result, Err(StoreError::Invariant(_))));
    }

    #[tokio::test]
    async fn conditional_add_respects_predicate() {
        let store = MemoryEventStore::new();
        let event = store
            .insert(new_event(Uuid::now_v7(), 1, Duration::hours(1)))
            .await
            .unwrap();
        let user = Uuid::now_v7();

        let joined = store.add_attendee_if_admissible(event.id, user).await.unwrap();
        assert_eq!(joined.unwrap().roster.count(), 1);

        assert!(store.add_attendee_if_admissible(event.id, user).await.unwrap().is_none());
        assert!(
            store
                .add_attendee_if_admissible(event.id, Uuid::now_v7())
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .add_attendee_if_admissible(Uuid::now_v7(), user)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn listings_are_sorted_and_filtered() {
        let store = MemoryEventStore::new();
        let creator = Uuid::now_v7();
        let later = store
            .insert(new_event(creator, 5, Duration::days(2)))
            .await
            .unwrap();
        let sooner = store
            .insert(new_event(creator, 5, Duration::days(1)))
            .await
            .unwrap();
        let past = store
            .insert(new_event(Uuid::now_v7(), 5, Duration::days(-1)))
            .await
            .unwrap();

        let upcoming = store.list_upcoming(OffsetDateTime::now_utc()).await.unwrap();
        let ids: Vec<Uuid> = upcoming.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);

        let created = store.list_created_by(creator).await.unwrap();
        assert_eq!(created.len(), 2);

        let user = Uuid::now_v7();
        store.add_attendee_if_admissible(past.id, user).await.unwrap();
        let attending = store.list_attended_by(user).await.unwrap();
        assert_eq!(attending.len(), 1);
        assert_eq!(attending[0].id, past.id);
    }

    #[tokio::test]
    async fn update_requires_owner_and_room_for_attendees() {
        let store = MemoryEventStore::new();
        let creator = Uuid::now_v7();
        let event = store
            .insert(new_event(creator, 3, Duration::hours(1)))
            .await
            .unwrap();
        store.add_attendee_if_admissible(event.id, Uuid::now_v7()).await.unwrap();
        store.add_attendee_if_admissible(event.id, Uuid::now_v7()).await.unwrap();

        let shrink = EventPatch {
            capacity: Some(1),
            ..Default::default()
        };
        assert!(store.update_if_owned(event.id, creator, shrink).await.unwrap().is_none());

        let rename = EventPatch {
            title: Some("Renamed".to_string()),
            capacity: Some(2),
            ..Default::default()
        };
        assert!(
            store
                .update_if_owned(event.id, Uuid::now_v7(), rename.clone())
                .await
                .unwrap()
                .is_none()
        );
        let updated = store.update_if_owned(event.id, creator, rename).await.unwrap().unwrap();
        assert_eq!(updated.details.title, "Renamed");
        assert_eq!(updated.roster.capacity(), 2);
        assert!(updated.roster.is_full());
    }

    #[tokio::test]
    async fn deleted_event_cannot_be_joined() {
        let store = MemoryEventStore::new();
        let creator = Uuid::now_v7();
        let event = store
            .insert(new_event(creator, 3, Duration::hours(1)))
            .await
            .unwrap();

        assert!(!store.delete_if_owned(event.id, Uuid::now_v7()).await.unwrap());
        assert!(store.delete_if_owned(event.id, creator).await.unwrap());
        assert!(!store.delete_if_owned(event.id, creator).await.unwrap());
        assert!(store.get(event.id).await.unwrap().is_none());
        assert!(
            store
                .add_attendee_if_admissible(event.id, Uuid::now_v7())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn accounts_are_unique_by_email() {
        let store = MemoryAccountStore::new();
        let new = NewAccount {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
        };
        let account = store.insert(new.clone()).await.unwrap().unwrap();
        assert!(store.insert(new).await.unwrap().is_none());
        assert_eq!(
            store.find_by_email("ada@example.com").await.unwrap(),
            Some(account.clone())
        );
        assert_eq!(store.find_by_id(account.id).await.unwrap(), Some(account));
    }

    #[tokio::test]
    async fn names_resolve_only_known_accounts() {
        let store = MemoryAccountStore::new();
        let ada = store
            .insert(NewAccount {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
            .unwrap();
        let stranger = Uuid::now_v7();

        let names = store.names_by_ids(&[ada.id, stranger]).await.unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names.get(&ada.id).map(String::as_str), Some("Ada"));
        assert!(!names.contains_key(&stranger));
    }
}
