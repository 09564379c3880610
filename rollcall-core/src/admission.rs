//! The admission controller: join and leave for a single event's roster.
//!
//! Each operation runs in two phases:
//!
//! 1. **Attempt.** One atomic conditional update against the
//!    [`EventStore`]. Its result is the only thing that decides whether a
//!    user got a seat.
//! 2. **Classify.** Only after a failed join: one plain read of the event to
//!    name the reason. The event may have changed since the attempt, so the
//!    reason is a best-effort explanation. It never feeds back into a write.
//!
//! Logical failures (`EventFull`, `AlreadyJoined`, `NotAttending`, ...) are
//! final answers. The controller never retries on its own.

use crate::entities::Event;
use crate::store::{EventStore, StoreError};
use kanau::processor::Processor;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

/// Reserve a seat for `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinEvent {
    pub event_id: Uuid,
    pub user_id: Uuid,
}

/// Release `user_id`'s seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveEvent {
    pub event_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("event not found")]
    EventNotFound,
    #[error("already joined")]
    AlreadyJoined,
    #[error("event full")]
    EventFull,
    #[error("not attending")]
    NotAttending,
    /// The conditional update failed but the follow-up read shows none of
    /// the reasons it checks for. Either the state moved back in between
    /// (e.g. a seat was freed) or the classification and the update
    /// predicate disagree, which is a bug.
    #[error("unable to join")]
    Unknown,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AdmissionError {
    /// Only store I/O failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdmissionError::Store(_))
    }
}

/// Explain why a join attempt failed, given the event as read afterwards.
///
/// Checks mirror the update predicate in order: existence, membership,
/// capacity.
pub fn classify_join_failure(snapshot: Option<&Event>, user_id: Uuid) -> AdmissionError {
    match snapshot {
        None => AdmissionError::EventNotFound,
        Some(event) if event.roster.contains(user_id) => AdmissionError::AlreadyJoined,
        Some(event) if event.roster.is_full() => AdmissionError::EventFull,
        Some(_) => AdmissionError::Unknown,
    }
}

#[derive(Clone)]
pub struct AdmissionController {
    store: Arc<dyn EventStore>,
}

impl AdmissionController {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }
}

impl Processor<JoinEvent> for AdmissionController {
    type Output = Event;
    type Error = AdmissionError;
    #[tracing::instrument(
        skip_all,
        name = "Admission:Join",
        fields(event_id = %cmd.event_id, user_id = %cmd.user_id)
    )]
    async fn process(&self, cmd: JoinEvent) -> Result<Event, AdmissionError> {
        // Phase 1: authoritative.
        if let Some(event) = self
            .store
            .add_attendee_if_admissible(cmd.event_id, cmd.user_id)
            .await?
        {
            debug!(
                attendees_count = event.roster.count(),
                capacity = event.roster.capacity(),
                "Joined"
            );
            return Ok(event);
        }

        // Phase 2: advisory, read-only.
        let snapshot = self.store.get(cmd.event_id).await?;
        let reason = classify_join_failure(snapshot.as_ref(), cmd.user_id);
        match &reason {
            AdmissionError::Unknown => {
                error!("Join rejected by the store but no reason found on re-read")
            }
            other => debug!(reason = %other, "Join rejected"),
        }
        Err(reason)
    }
}

impl Processor<LeaveEvent> for AdmissionController {
    type Output = Event;
    type Error = AdmissionError;
    #[tracing::instrument(
        skip_all,
        name = "Admission:Leave",
        fields(event_id = %cmd.event_id, user_id = %cmd.user_id)
    )]
    async fn process(&self, cmd: LeaveEvent) -> Result<Event, AdmissionError> {
        match self
            .store
            .remove_attendee_if_present(cmd.event_id, cmd.user_id)
            .await?
        {
            Some(event) => {
                debug!(attendees_count = event.roster.count(), "Left");
                Ok(event)
            }
            None => {
                debug!("Leave rejected");
                Err(AdmissionError::NotAttending)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::{EventDetails, NewEvent};
    use crate::roster::Roster;
    use crate::store::MemoryEventStore;
    use time::OffsetDateTime;

    async fn setup(capacity: u32) -> (AdmissionController, Arc<MemoryEventStore>, Uuid) {
        let store = Arc::new(MemoryEventStore::new());
        let event = store
            .insert(NewEvent {
                details: EventDetails {
                    title: "Concurrency Test".to_string(),
                    description: None,
                    date: OffsetDateTime::now_utc() + time::Duration::hours(1),
                    location: Some("Test Lab".to_string()),
                },
                capacity,
                creator: Uuid::now_v7(),
            })
            .await
            .unwrap();
        (AdmissionController::new(store.clone()), store, event.id)
    }

    fn event_with(roster: Roster) -> Event {
        let now = OffsetDateTime::now_utc();
        Event {
            id: Uuid::now_v7(),
            details: EventDetails {
                title: "x".to_string(),
                description: None,
                date: now,
                location: None,
            },
            creator: Uuid::now_v7(),
            roster,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn classification_covers_each_reason() {
        let user = Uuid::now_v7();
        assert!(matches!(
            classify_join_failure(None, user),
            AdmissionError::EventNotFound
        ));

        let mut roster = Roster::new(1).unwrap();
        roster.try_add(user).unwrap();
        let full_with_user = event_with(roster);
        assert!(matches!(
            classify_join_failure(Some(&full_with_user), user),
            AdmissionError::AlreadyJoined
        ));
        assert!(matches!(
            classify_join_failure(Some(&full_with_user), Uuid::now_v7()),
            AdmissionError::EventFull
        ));

        let open = event_with(Roster::new(3).unwrap());
        assert!(matches!(
            classify_join_failure(Some(&open), user),
            AdmissionError::Unknown
        ));
    }

    #[tokio::test]
    async fn join_leave_and_leave_again() {
        let (controller, store, event_id) = setup(5).await;
        let user = Uuid::now_v7();
        let before = store.get(event_id).await.unwrap().unwrap();

        let joined = controller.process(JoinEvent { event_id, user_id: user }).await.unwrap();
        assert_eq!(joined.roster.count(), 1);
        assert!(joined.roster.contains(user));

        let left = controller.process(LeaveEvent { event_id, user_id: user }).await.unwrap();
        assert_eq!(left.roster, before.roster);

        let again = controller.process(LeaveEvent { event_id, user_id: user }).await;
        assert!(matches!(again, Err(AdmissionError::NotAttending)));
        assert_eq!(store.get(event_id).await.unwrap().unwrap().roster.count(), 0);
    }

    #[tokio::test]
    async fn second_join_reports_already_joined() {
        let (controller, _store, event_id) = setup(5).await;
        let user = Uuid::now_v7();
        controller.process(JoinEvent { event_id, user_id: user }).await.unwrap();
        let again = controller.process(JoinEvent { event_id, user_id: user }).await;
        assert!(matches!(again, Err(AdmissionError::AlreadyJoined)));
    }

    #[tokio::test]
    async fn full_event_reports_event_full() {
        let (controller, _store, event_id) = setup(1).await;
        controller
            .process(JoinEvent { event_id, user_id: Uuid::now_v7() })
            .await
            .unwrap();
        let err = controller
            .process(JoinEvent { event_id, user_id: Uuid::now_v7() })
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::EventFull));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn missing_event_reports_not_found() {
        let (controller, _store, _) = setup(1).await;
        let err = controller
            .process(JoinEvent {
                event_id: Uuid::now_v7(),
                user_id: Uuid::now_v7(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::EventNotFound));
    }

    #[tokio::test]
    async fn repeated_leave_by_non_member_never_mutates() {
        let (controller, store, event_id) = setup(3).await;
        let member = Uuid::now_v7();
        controller.process(JoinEvent { event_id, user_id: member }).await.unwrap();
        let before = store.get(event_id).await.unwrap().unwrap();

        let stranger = Uuid::now_v7();
        for _ in 0..5 {
            let result = controller.process(LeaveEvent { event_id, user_id: stranger }).await;
            assert!(matches!(result, Err(AdmissionError::NotAttending)));
        }
        let after = store.get(event_id).await.unwrap().unwrap();
        assert_eq!(after.roster, before.roster);
    }
}
