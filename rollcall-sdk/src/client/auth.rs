//! Auth API client (signup / login).

use reqwest::Client;
use url::Url;

use super::{ClientError, EventsClient, parse_response};
use crate::objects::{AuthResponse, LoginRequest, SignupRequest};

/// Typed HTTP client for `/api/auth`.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    base_url: Url,
}

impl AuthClient {
    /// Create a new `AuthClient` against the server root URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /api/auth/signup`.
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError> {
        let url = self.base_url.join("/api/auth/signup")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// `POST /api/auth/login`.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let url = self.base_url.join("/api/auth/login")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// An [`EventsClient`] sharing this client's connection pool and
    /// authenticated with `token`.
    pub fn events(&self, token: impl Into<String>) -> EventsClient {
        EventsClient::new(self.base_url.clone(), token).with_http_client(self.http.clone())
    }
}
