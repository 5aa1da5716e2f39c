//! Response bodies and domain DTOs.
//!
//! # Design
//! The DTOs mirror the mock-server's schema but are defined independently;
//! integration tests catch drift between the two crates.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;

/// A successful response body: decoded JSON when the server declared
/// `application/json`, the raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            Body::Json(_) => None,
        }
    }

    /// Deserialize a JSON body into `T`. A text body is a decode error.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Body::Json(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
            }
            Body::Text(_) => Err(ApiError::Decode(
                "expected a JSON response, got text".to_string(),
            )),
        }
    }
}

/// A pharmacy document as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyDetails {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub contact: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for registering a pharmacy. `createdAt` is assigned by
/// the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPharmacy {
    pub name: String,
    pub address: String,
    pub contact: String,
}

/// Partial update for a pharmacy. Omitted fields stay unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PharmacyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub pharmacy_id: String,
    pub name: String,
    pub quantity: u32,
}
