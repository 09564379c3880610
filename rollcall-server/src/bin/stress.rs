//! Overbooking check against a running rollcall server.
//!
//! Signs up a creator and `--users` attendees, creates one event with
//! `--capacity` seats, then fires every join at once. Exits with status 2
//! when more users got in than there are seats.

use clap::Parser;
use futures_util::future::join_all;
use rollcall_sdk::client::AuthClient;
use rollcall_sdk::objects::{CreateEventRequest, SignupRequest};
use std::collections::BTreeMap;
use std::process::ExitCode;
use time::{Duration, OffsetDateTime};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "rollcall-stress")]
#[command(version, about = "Concurrent join stress test", long_about = None)]
struct Args {
    /// Root URL of the server under test
    #[arg(long, env = "API_BASE", default_value = "http://localhost:5000")]
    api: Url,

    /// Seats on the test event
    #[arg(short, long, default_value_t = 5)]
    capacity: u32,

    /// Concurrent joiners
    #[arg(short, long, default_value_t = 20)]
    users: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let auth = AuthClient::new(args.api.clone());
    let run = OffsetDateTime::now_utc().unix_timestamp_nanos();

    let signup = |name: String| {
        let auth = auth.clone();
        async move {
            auth.signup(&SignupRequest {
                email: format!("{name}+{run}@example.com"),
                name,
                password: "password".to_string(),
            })
            .await
        }
    };

    let creator = signup("creator".to_string()).await?;
    let creator_events = auth.events(creator.token);
    let event = creator_events
        .create(&CreateEventRequest {
            title: format!("Stress Event {run}"),
            description: Some("Concurrency check".to_string()),
            date: Some(OffsetDateTime::now_utc() + Duration::days(1)),
            location: Some("Online".to_string()),
            capacity: Some(i64::from(args.capacity)),
        })
        .await?;
    tracing::info!(event_id = %event.id, capacity = args.capacity, "Created event");

    let mut attendees = Vec::with_capacity(args.users);
    for i in 0..args.users {
        let user = signup(format!("user{i}")).await?;
        attendees.push(auth.events(user.token));
    }
    tracing::info!(users = attendees.len(), "Signed up attendees, joining concurrently");

    let results = join_all(attendees.iter().map(|client| client.join(event.id))).await;

    let mut joined = 0usize;
    let mut failures: BTreeMap<String, usize> = BTreeMap::new();
    for result in results {
        match result {
            Ok(_) => joined += 1,
            Err(e) => {
                let reason = e.message().unwrap_or_else(|| e.to_string());
                *failures.entry(reason).or_default() += 1;
            }
        }
    }

    let final_state = creator_events.get(event.id).await?;
    tracing::info!(
        joined,
        attendees_count = final_state.attendees_count,
        capacity = final_state.capacity,
        ?failures,
        "Join results"
    );

    let overbooked = joined > args.capacity as usize
        || final_state.attendees_count > final_state.capacity
        || final_state.attendees.len() != final_state.attendees_count as usize;
    if overbooked {
        tracing::error!("Capacity invariant violated");
        return Ok(ExitCode::from(2));
    }

    tracing::info!("No overbooking detected");
    Ok(ExitCode::SUCCESS)
}
