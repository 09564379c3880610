//! Events API client.
//!
//! Every request carries `Authorization: Bearer {token}`; the public read
//! endpoints simply ignore it.

use reqwest::{Client, Method, RequestBuilder};
use url::Url;
use uuid::Uuid;

use super::{ClientError, parse_response};
use crate::objects::{
    AttendanceResponse, CreateEventRequest, EventResponse, GenerateDescriptionRequest,
    GenerateDescriptionResponse, MessageResponse, MyEventsResponse, UpdateEventRequest,
};
use crate::token::BEARER_PREFIX;

/// Typed HTTP client for `/api/events`.
#[derive(Debug, Clone)]
pub struct EventsClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl EventsClient {
    /// Create a new `EventsClient`.
    ///
    /// * `base_url` – root URL of the rollcall server.
    /// * `token` – the token returned by signup or login.
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base_url.join(path)?;
        Ok(self
            .http
            .request(method, url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("{BEARER_PREFIX}{}", self.token),
            ))
    }

    /// `POST /api/events`.
    pub async fn create(&self, request: &CreateEventRequest) -> Result<EventResponse, ClientError> {
        let resp = self
            .request(Method::POST, "/api/events")?
            .json(request)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `GET /api/events` – upcoming events.
    pub async fn list_upcoming(&self) -> Result<Vec<EventResponse>, ClientError> {
        let resp = self.request(Method::GET, "/api/events")?.send().await?;
        parse_response(resp).await
    }

    /// `GET /api/events/mine`.
    pub async fn mine(&self) -> Result<MyEventsResponse, ClientError> {
        let resp = self.request(Method::GET, "/api/events/mine")?.send().await?;
        parse_response(resp).await
    }

    /// `GET /api/events/{id}`.
    pub async fn get(&self, event_id: Uuid) -> Result<EventResponse, ClientError> {
        let resp = self
            .request(Method::GET, &format!("/api/events/{event_id}"))?
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `PUT /api/events/{id}`.
    pub async fn update(
        &self,
        event_id: Uuid,
        request: &UpdateEventRequest,
    ) -> Result<EventResponse, ClientError> {
        let resp = self
            .request(Method::PUT, &format!("/api/events/{event_id}"))?
            .json(request)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `DELETE /api/events/{id}`.
    pub async fn delete(&self, event_id: Uuid) -> Result<MessageResponse, ClientError> {
        let resp = self
            .request(Method::DELETE, &format!("/api/events/{event_id}"))?
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /api/events/{id}/join`.
    pub async fn join(&self, event_id: Uuid) -> Result<AttendanceResponse, ClientError> {
        let resp = self
            .request(Method::POST, &format!("/api/events/{event_id}/join"))?
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /api/events/{id}/leave`.
    pub async fn leave(&self, event_id: Uuid) -> Result<AttendanceResponse, ClientError> {
        let resp = self
            .request(Method::POST, &format!("/api/events/{event_id}/leave"))?
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /api/events/generate-description`.
    pub async fn generate_description(
        &self,
        request: &GenerateDescriptionRequest,
    ) -> Result<GenerateDescriptionResponse, ClientError> {
        let resp = self
            .request(Method::POST, "/api/events/generate-description")?
            .json(request)
            .send()
            .await?;
        parse_response(resp).await
    }
}
