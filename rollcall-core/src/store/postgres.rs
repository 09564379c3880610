//! Postgres backend: the store traits implemented on [`DatabaseProcessor`]
//! by dispatching to the processor commands in [`crate::entities`].

use super::{AccountStore, EventStore, StoreError};
use crate::entities::account_records::{
    GetAccountNamesByIds, GetAccountRecordByEmail, GetAccountRecordById, InsertAccountRecord,
};
use crate::entities::event_records::{
    AddAttendeeIfAdmissible, DeleteEventRecordIfOwned, EventRow, GetEventRecordById,
    InsertEventRecord, ListEventRecordsAttendedBy, ListEventRecordsCreatedBy,
    ListUpcomingEventRecords, RemoveAttendeeIfPresent, UpdateEventRecordIfOwned,
};
use crate::entities::{Account, Event, EventPatch, NewAccount, NewEvent};
use crate::framework::DatabaseProcessor;
use crate::roster::RosterError;
use async_trait::async_trait;
use kanau::processor::Processor;
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;

fn to_event(row: Option<EventRow>) -> Result<Option<Event>, StoreError> {
    Ok(row.map(Event::try_from).transpose()?)
}

fn to_events(rows: Vec<EventRow>) -> Result<Vec<Event>, StoreError> {
    rows.into_iter()
        .map(|row| Event::try_from(row).map_err(StoreError::from))
        .collect()
}

fn to_column(value: u32) -> Result<i32, RosterError> {
    i32::try_from(value).map_err(|_| RosterError::OutOfRange(value.into()))
}

#[async_trait]
impl EventStore for DatabaseProcessor {
    async fn insert(&self, new: NewEvent) -> Result<Event, StoreError> {
        if new.capacity == 0 {
            return Err(RosterError::ZeroCapacity.into());
        }
        let row = self
            .process(InsertEventRecord {
                id: Uuid::now_v7(),
                title: new.details.title,
                description: new.details.description,
                date: new.details.date,
                location: new.details.location,
                capacity: to_column(new.capacity)?,
                creator: new.creator,
            })
            .await?;
        Ok(Event::try_from(row)?)
    }

    async fn get(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        to_event(self.process(GetEventRecordById { event_id }).await?)
    }

    async fn list_upcoming(&self, now: OffsetDateTime) -> Result<Vec<Event>, StoreError> {
        to_events(self.process(ListUpcomingEventRecords { now }).await?)
    }

    async fn list_created_by(&self, user_id: Uuid) -> Result<Vec<Event>, StoreError> {
        to_events(self.process(ListEventRecordsCreatedBy { user_id }).await?)
    }

    async fn list_attended_by(&self, user_id: Uuid) -> Result<Vec<Event>, StoreError> {
        to_events(self.process(ListEventRecordsAttendedBy { user_id }).await?)
    }

    async fn add_attendee_if_admissible(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Event>, StoreError> {
        to_event(
            self.process(AddAttendeeIfAdmissible { event_id, user_id })
                .await?,
        )
    }

    async fn remove_attendee_if_present(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Event>, StoreError> {
        to_event(
            self.process(RemoveAttendeeIfPresent { event_id, user_id })
                .await?,
        )
    }

    async fn update_if_owned(
        &self,
        event_id: Uuid,
        creator: Uuid,
        patch: EventPatch,
    ) -> Result<Option<Event>, StoreError> {
        if patch.capacity == Some(0) {
            return Ok(None);
        }
        let capacity = patch.capacity.map(to_column).transpose()?;
        to_event(
            self.process(UpdateEventRecordIfOwned {
                event_id,
                creator,
                title: patch.title,
                description: patch.description,
                date: patch.date,
                location: patch.location,
                capacity,
            })
            .await?,
        )
    }

    async fn delete_if_owned(&self, event_id: Uuid, creator: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .process(DeleteEventRecordIfOwned { event_id, creator })
            .await?)
    }
}

#[async_trait]
impl AccountStore for DatabaseProcessor {
    async fn insert(&self, new: NewAccount) -> Result<Option<Account>, StoreError> {
        let row = self
            .process(InsertAccountRecord {
                id: Uuid::now_v7(),
                name: new.name,
                email: new.email,
                password_hash: new.password_hash,
            })
            .await?;
        Ok(row.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = self
            .process(GetAccountRecordByEmail {
                email: email.to_owned(),
            })
            .await?;
        Ok(row.map(Account::from))
    }

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, StoreError> {
        let row = self.process(GetAccountRecordById { account_id }).await?;
        Ok(row.map(Account::from))
    }

    async fn names_by_ids(
        &self,
        account_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, StoreError> {
        if account_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = self
            .process(GetAccountNamesByIds {
                account_ids: account_ids.to_vec(),
            })
            .await?;
        Ok(rows.into_iter().collect())
    }
}
