//! Session-aware API client core for the pharmacy portal backend.
//!
//! # Overview
//! Reads the current user's session from client-local storage, attaches its
//! bearer token to outbound requests, and normalizes responses into JSON or
//! text bodies. Request building and response parsing are pure; a
//! [`Transport`] executes the round trip in between.
//!
//! # Design
//! - `session` never fails: missing or corrupt storage yields an empty
//!   session, and inconsistent historical key spellings are collapsed by
//!   ordered precedence lists.
//! - `ApiClient` splits every call into `build_*` (produces an
//!   [`HttpRequest`]) and `parse_response` (consumes an [`HttpResponse`]).
//! - Storage is injected through [`SessionStorage`], so the reader runs the
//!   same against memory, a file, or a host-provided store.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod storage;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::{Config, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{read_session, RawSession, Session, DEFAULT_PHARMACY_NAME, SESSION_KEY};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use transport::{Transport, UreqTransport};
pub use types::{Body, InventoryItem, NewPharmacy, PharmacyDetails, PharmacyPatch};
