//! Shared types for the rollcall event service.
//!
//! - [`objects`] holds the JSON request and response bodies.
//! - [`token`] implements the bearer tokens the server issues on login.
//! - `client` (behind the `client` feature) is a typed HTTP client.

pub mod objects;
pub mod token;

#[cfg(feature = "client")]
pub mod client;
