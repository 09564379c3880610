//! Concurrency stress tests for the admission controller.
//!
//! Many tasks hit the same event at once on a multi-threaded runtime; the
//! roster must never exceed capacity and the counter must always match
//! the member list.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use futures_util::future::join_all;
use kanau::processor::Processor;
use rollcall_core::admission::{AdmissionController, AdmissionError, JoinEvent, LeaveEvent};
use rollcall_core::entities::{EventDetails, NewEvent};
use rollcall_core::store::{EventStore, MemoryEventStore};
use std::collections::HashSet;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

async fn create_event(store: &MemoryEventStore, capacity: u32) -> Uuid {
    store
        .insert(NewEvent {
            details: EventDetails {
                title: format!("Concurrency Test {capacity}"),
                description: Some("Testing concurrent joins".to_string()),
                date: OffsetDateTime::now_utc() + time::Duration::hours(1),
                location: Some("Test Lab".to_string()),
            },
            capacity,
            creator: Uuid::now_v7(),
        })
        .await
        .expect("insert event")
        .id
}

async fn concurrent_joins(
    controller: &AdmissionController,
    event_id: Uuid,
    users: &[Uuid],
) -> Vec<Result<(), AdmissionError>> {
    let handles = users.iter().map(|&user_id| {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .process(JoinEvent { event_id, user_id })
                .await
                .map(|_| ())
        })
    });
    join_all(handles)
        .await
        .into_iter()
        .map(|r| r.expect("join task panicked"))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn twenty_users_five_seats() {
    let store = Arc::new(MemoryEventStore::new());
    let controller = AdmissionController::new(store.clone());
    let event_id = create_event(&store, 5).await;

    let users: Vec<Uuid> = (0..20).map(|_| Uuid::now_v7()).collect();
    let results = concurrent_joins(&controller, event_id, &users).await;

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let full = results
        .iter()
        .filter(|r| matches!(r, Err(AdmissionError::EventFull)))
        .count();
    assert_eq!(successes, 5);
    assert_eq!(full, 15);

    let event = store.get(event_id).await.unwrap().unwrap();
    assert_eq!(event.roster.count(), 5);
    assert_eq!(event.roster.attendees().len(), 5);
    let winners: HashSet<Uuid> = users
        .iter()
        .zip(&results)
        .filter(|(_, r)| r.is_ok())
        .map(|(u, _)| *u)
        .collect();
    let members: HashSet<Uuid> = event.roster.attendees().iter().copied().collect();
    assert_eq!(winners, members);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn same_user_twice_on_single_seat() {
    let store = Arc::new(MemoryEventStore::new());
    let controller = AdmissionController::new(store.clone());
    let event_id = create_event(&store, 1).await;

    let user = Uuid::now_v7();
    let results = concurrent_joins(&controller, event_id, &[user, user]).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = results.into_iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        failure,
        Err(AdmissionError::AlreadyJoined | AdmissionError::EventFull)
    ));
    let event = store.get(event_id).await.unwrap().unwrap();
    assert_eq!(event.roster.count(), 1);
    assert_eq!(event.roster.attendees(), &[user]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn duplicate_joiners_admitted_once_each() {
    let store = Arc::new(MemoryEventStore::new());
    let controller = AdmissionController::new(store.clone());
    let event_id = create_event(&store, 50).await;

    // 10 users, each trying 5 times at once.
    let distinct: Vec<Uuid> = (0..10).map(|_| Uuid::now_v7()).collect();
    let attempts: Vec<Uuid> = distinct.iter().flat_map(|u| [*u; 5]).collect();
    let results = concurrent_joins(&controller, event_id, &attempts).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 10);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(AdmissionError::AlreadyJoined)))
    );
    let event = store.get(event_id).await.unwrap().unwrap();
    assert_eq!(event.roster.count(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn mixed_join_and_leave_never_overbooks() {
    let store = Arc::new(MemoryEventStore::new());
    let controller = AdmissionController::new(store.clone());
    let capacity = 7;
    let event_id = create_event(&store, capacity).await;

    let users: Vec<Uuid> = (0..40).map(|_| Uuid::now_v7()).collect();
    let handles = users.iter().map(|&user_id| {
        let controller = controller.clone();
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..10 {
                if controller
                    .process(JoinEvent { event_id, user_id })
                    .await
                    .is_ok()
                {
                    let snapshot = store.get(event_id).await.unwrap().unwrap();
                    assert!(snapshot.roster.count() <= capacity);
                    assert_eq!(
                        snapshot.roster.count() as usize,
                        snapshot.roster.attendees().len()
                    );
                    tokio::task::yield_now().await;
                    controller
                        .process(LeaveEvent { event_id, user_id })
                        .await
                        .expect("member can leave");
                }
            }
        })
    });
    for handle in join_all(handles).await {
        handle.expect("task panicked");
    }

    let event = store.get(event_id).await.unwrap().unwrap();
    assert_eq!(event.roster.count(), 0);
    assert!(event.roster.attendees().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn distinct_events_fill_independently() {
    let store = Arc::new(MemoryEventStore::new());
    let controller = AdmissionController::new(store.clone());
    let events = [
        create_event(&store, 3).await,
        create_event(&store, 4).await,
        create_event(&store, 5).await,
    ];

    let users: Vec<Uuid> = (0..12).map(|_| Uuid::now_v7()).collect();
    let handles = events.iter().flat_map(|&event_id| {
        let controller = controller.clone();
        users.clone().into_iter().map(move |user_id| {
            let controller = controller.clone();
            tokio::spawn(async move { controller.process(JoinEvent { event_id, user_id }).await })
        })
    });
    let _ = join_all(handles).await;

    for (event_id, capacity) in events.iter().zip([3u32, 4, 5]) {
        let event = store.get(*event_id).await.unwrap().unwrap();
        assert_eq!(event.roster.count(), capacity);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn join_racing_delete_never_resurrects() {
    let store = Arc::new(MemoryEventStore::new());
    let controller = AdmissionController::new(store.clone());
    let creator = Uuid::now_v7();
    let event_id = store
        .insert(NewEvent {
            details: EventDetails {
                title: "Doomed".to_string(),
                description: None,
                date: OffsetDateTime::now_utc() + time::Duration::hours(1),
                location: None,
            },
            capacity: 100,
            creator,
        })
        .await
        .unwrap()
        .id;

    let users: Vec<Uuid> = (0..50).map(|_| Uuid::now_v7()).collect();
    let joins = users.iter().map(|&user_id| {
        let controller = controller.clone();
        tokio::spawn(async move { controller.process(JoinEvent { event_id, user_id }).await })
    });
    let delete = {
        let store = store.clone();
        tokio::spawn(async move { store.delete_if_owned(event_id, creator).await })
    };

    let results = join_all(joins).await;
    assert!(delete.await.unwrap().unwrap());
    for result in results {
        match result.unwrap() {
            Ok(_) | Err(AdmissionError::EventNotFound) => {}
            other => panic!("unexpected join outcome: {other:?}"),
        }
    }
    assert!(store.get(event_id).await.unwrap().is_none());
    assert!(matches!(
        controller
            .process(JoinEvent {
                event_id,
                user_id: Uuid::now_v7()
            })
            .await,
        Err(AdmissionError::EventNotFound)
    ));
}
