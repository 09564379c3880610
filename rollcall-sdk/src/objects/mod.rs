//! Request and response bodies.
//!
//! All bodies are camelCase JSON. Failures are always a [`MessageResponse`].

pub mod auth;
pub mod events;

pub use auth::{AuthResponse, LoginRequest, SignupRequest, UserResponse};
pub use events::{
    AttendanceResponse, CreateEventRequest, EventCreator, EventResponse,
    GenerateDescriptionRequest, GenerateDescriptionResponse, MyEventsResponse, UpdateEventRequest,
};

use serde::{Deserialize, Serialize};

/// `{ "message": "..." }`, the body of every error response and of a few
/// plain acknowledgements such as a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
