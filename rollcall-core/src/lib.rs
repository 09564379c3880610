#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod admission;
pub mod config;
pub mod description;
pub mod entities;
pub mod framework;
pub mod password;
pub mod roster;
pub mod store;
