//! Session-aware HTTP request builder and response parser for the pharmacy API.
//!
//! # Design
//! `ApiClient` holds the resolved base URL, a handle to session storage and a
//! transport. Each operation is split into a `build_*` method that produces
//! an `HttpRequest` and [`ApiClient::parse_response`], which consumes an
//! `HttpResponse`. The `get`/`post`/`patch` entry points run both halves
//! around a single transport call.
//!
//! The session is read from storage every time a request is built, so the
//! `Authorization` header always reflects what storage holds right now.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::{read_session, Session};
use crate::storage::SessionStorage;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Body, InventoryItem, NewPharmacy, PharmacyDetails, PharmacyPatch};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Client for the pharmacy backend.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    storage: Arc<dyn SessionStorage>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client that sends requests with [`UreqTransport`].
    pub fn new(config: &Config, storage: impl SessionStorage + 'static) -> Self {
        Self {
            base_url: config.base_url().to_string(),
            storage: Arc::new(storage),
            transport: Arc::new(UreqTransport::new()),
        }
    }

    /// Replace the transport used by `get`/`post`/`patch`.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current session, read fresh from storage.
    pub fn session(&self) -> Session {
        read_session(self.storage.as_ref())
    }

    pub fn build_get(&self, path: &str, query: &[(&str, &str)]) -> HttpRequest {
        let mut url = format!("{}{path}", self.base_url);
        if !query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }
        self.request(HttpMethod::Get, url, None)
    }

    pub fn build_post<B>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        Ok(self.request(HttpMethod::Post, format!("{}{path}", self.base_url), Some(body)))
    }

    pub fn build_patch<B>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        Ok(self.request(HttpMethod::Patch, format!("{}{path}", self.base_url), Some(body)))
    }

    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())];
        let session = self.session();
        if let Some(token) = &session.token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    /// Turn a raw response into a [`Body`], or an error for non-2xx statuses.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Body, ApiError> {
        if !response.is_success() {
            let message = if response.body.is_empty() {
                format!("HTTP {}", response.status)
            } else {
                response.body
            };
            return Err(ApiError::Status {
                status: response.status,
                message,
            });
        }

        let declares_json = response
            .header("content-type")
            .is_some_and(|value| value.to_ascii_lowercase().contains(JSON_CONTENT_TYPE));
        if declares_json {
            serde_json::from_str(&response.body)
                .map(Body::Json)
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            Ok(Body::Text(response.body))
        }
    }

    fn send(&self, request: HttpRequest) -> Result<Body, ApiError> {
        debug!(
            method = request.method.as_str(),
            url = %request.url,
            authenticated = request.header("authorization").is_some(),
            "sending request"
        );
        let response = self.transport.execute(&request).inspect_err(|e| {
            warn!(method = request.method.as_str(), url = %request.url, "request failed: {e}");
        })?;
        debug!(status = response.status, url = %request.url, "received response");
        self.parse_response(response)
    }

    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Body, ApiError> {
        self.send(self.build_get(path, query))
    }

    pub fn post<B>(&self, path: &str, body: &B) -> Result<Body, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.build_post(path, body)?)
    }

    /// POST with an empty JSON object as the body.
    pub fn post_empty(&self, path: &str) -> Result<Body, ApiError> {
        self.post(path, &empty_record())
    }

    pub fn patch<B>(&self, path: &str, body: &B) -> Result<Body, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.build_patch(path, body)?)
    }

    /// PATCH with an empty JSON object as the body.
    pub fn patch_empty(&self, path: &str) -> Result<Body, ApiError> {
        self.patch(path, &empty_record())
    }

    /// Inventory items, optionally limited to one pharmacy.
    pub fn list_inventory(&self, pharmacy_id: Option<&str>) -> Result<Vec<InventoryItem>, ApiError> {
        let query: Vec<(&str, &str)> = pharmacy_id.map(|id| ("pharmacyId", id)).into_iter().collect();
        self.get("/api/inventory", &query)?.json()
    }

    pub fn list_pharmacies(&self) -> Result<Vec<PharmacyDetails>, ApiError> {
        self.get("/api/pharmacies", &[])?.json()
    }

    pub fn create_pharmacy(&self, input: &NewPharmacy) -> Result<PharmacyDetails, ApiError> {
        self.post("/api/pharmacies", input)?.json()
    }

    pub fn update_pharmacy(&self, id: Uuid, input: &PharmacyPatch) -> Result<PharmacyDetails, ApiError> {
        self.patch(&format!("/api/pharmacies/{id}"), input)?.json()
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn empty_record() -> Value {
    Value::Object(Map::new())
}
