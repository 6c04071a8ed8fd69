//! Blocking client for the accounts API.
//!
//! # Design
//! `AccountsClient` holds an immutable `ClientConfig` and a shared
//! `Transport`, nothing else, so one instance can serve any number of
//! threads. Each operation is split three ways:
//!
//! - `build_*` produces an `HttpRequest` and `parse_*` consumes an
//!   `HttpResponse`. Both are pure and deterministic.
//! - `try_*` wires them through the transport under the retry policy and
//!   returns a typed `ApiError` on failure.
//! - `create`/`fetch`/`delete` collapse that into an `Outcome`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Outcome};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::AccountApiPayload;

#[derive(Clone)]
pub struct AccountsClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl Default for AccountsClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl std::fmt::Debug for AccountsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AccountsClient {
    /// Client backed by a blocking `ureq` transport.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_create(&self, payload: &AccountApiPayload) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.config.base_url.clone(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_fetch(&self, id: &str) -> Result<HttpRequest, ApiError> {
        if id.is_empty() {
            return Err(ApiError::InvalidRequest("account id is empty".to_string()));
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/{id}", self.config.base_url),
            headers: Vec::new(),
            body: None,
        })
    }

    /// A missing `version` leaves the query parameter out; the service
    /// decides what to make of that.
    pub fn build_delete(&self, id: &str, version: Option<i64>) -> HttpRequest {
        let path = match version {
            Some(version) => format!("{}/{id}?version={version}", self.config.base_url),
            None => format!("{}/{id}", self.config.base_url),
        };
        HttpRequest {
            method: HttpMethod::Delete,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_fetch(&self, response: HttpResponse) -> Result<AccountApiPayload, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    #[tracing::instrument(skip(self, payload), fields(id = ?payload.id()))]
    pub fn try_create(&self, payload: &AccountApiPayload) -> Result<(), ApiError> {
        self.config.retry_policy().run("create account", || {
            let request = self.build_create(payload)?;
            self.send(&request).and_then(|r| self.parse_create(r))
        })
    }

    /// An empty `id` is rejected before the retry loop, without any attempt.
    #[tracing::instrument(skip(self))]
    pub fn try_fetch(&self, id: &str) -> Result<AccountApiPayload, ApiError> {
        let request = self.build_fetch(id)?;
        self.config
            .retry_policy()
            .run("fetch account", || self.send(&request).and_then(|r| self.parse_fetch(r)))
    }

    #[tracing::instrument(skip(self))]
    pub fn try_delete(&self, id: &str, version: Option<i64>) -> Result<(), ApiError> {
        let request = self.build_delete(id, version);
        self.config
            .retry_policy()
            .run("delete account", || self.send(&request).and_then(|r| self.parse_delete(r)))
    }

    pub fn create(&self, payload: &AccountApiPayload) -> Outcome {
        Outcome::from(&self.try_create(payload))
    }

    /// Returns the empty payload alongside `Outcome::Failure`. An empty `id`
    /// fails without touching the network.
    pub fn fetch(&self, id: &str) -> (AccountApiPayload, Outcome) {
        match self.try_fetch(id) {
            Ok(payload) => (payload, Outcome::Success),
            Err(e) => {
                if matches!(e, ApiError::InvalidRequest(_)) {
                    warn!("fetch account: {e}");
                }
                (AccountApiPayload::default(), Outcome::Failure)
            }
        }
    }

    pub fn delete(&self, id: &str, version: Option<i64>) -> Outcome {
        Outcome::from(&self.try_delete(id, version))
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = ?request.method, path = %request.path, "sending request");
        self.transport.execute(request)
    }
}

/// Anything at or above 300 is a failure; the body is kept for diagnostics.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status < 300 {
        return Ok(());
    }
    Err(ApiError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}
