//! Session store reader.
//!
//! # Design
//! The stored record has accumulated several spellings for the same field
//! over time. Reading happens in two steps:
//! 1. The raw string under [`SESSION_KEY`] is parsed into a [`RawSession`],
//!    which keeps every known spelling. Anything unparsable becomes the empty
//!    record.
//! 2. [`Session::from_raw`] collapses the spellings through ordered accessor
//!    lists, first defined value wins.
//!
//! The reader never fails and is re-run on every request, so a login or
//! logout written to storage is picked up by the next call.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::storage::SessionStorage;

/// Storage key holding the serialized session record.
pub const SESSION_KEY: &str = "session";

/// Display name used when the record carries no name-like field.
pub const DEFAULT_PHARMACY_NAME: &str = "Pharmacy";

/// The session record as stored, with every historical key spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawSession {
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: Option<String>,

    #[serde(rename = "pharmacyId", default, deserialize_with = "lenient_string")]
    pub pharmacy_id: Option<String>,

    #[serde(rename = "pharmacyID", default, deserialize_with = "lenient_string")]
    pub pharmacy_id_upper: Option<String>,

    #[serde(rename = "pharmacy_id", default, deserialize_with = "lenient_string")]
    pub pharmacy_id_snake: Option<String>,

    #[serde(rename = "pharmacyName", default, deserialize_with = "lenient_string")]
    pub pharmacy_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_user")]
    pub user: Option<RawUser>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub token: Option<String>,
}

/// Nested `user` object of the stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawUser {
    #[serde(rename = "shopName", default, deserialize_with = "lenient_string")]
    pub shop_name: Option<String>,
}

impl RawSession {
    /// Parse a stored string. Invalid JSON, a non-object top level, or
    /// `null` all yield the empty record.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_else(|e| {
                debug!("stored session has an unexpected shape: {e}");
                Self::default()
            }),
            Ok(_) => {
                debug!("stored session is not a JSON object");
                Self::default()
            }
            Err(e) => {
                debug!("stored session is not valid JSON: {e}");
                Self::default()
            }
        }
    }
}

/// Strings are kept as-is and numbers as their decimal text; any other JSON
/// value counts as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_user<'de, D>(deserializer: D) -> Result<Option<RawUser>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

type Accessor = fn(&RawSession) -> Option<&str>;

fn pharmacy_id(raw: &RawSession) -> Option<&str> {
    raw.pharmacy_id.as_deref()
}

fn pharmacy_id_upper(raw: &RawSession) -> Option<&str> {
    raw.pharmacy_id_upper.as_deref()
}

fn pharmacy_id_snake(raw: &RawSession) -> Option<&str> {
    raw.pharmacy_id_snake.as_deref()
}

fn pharmacy_name(raw: &RawSession) -> Option<&str> {
    raw.pharmacy_name.as_deref()
}

fn user_shop_name(raw: &RawSession) -> Option<&str> {
    raw.user.as_ref()?.shop_name.as_deref()
}

const PHARMACY_ID_FIELDS: &[Accessor] = &[pharmacy_id, pharmacy_id_upper, pharmacy_id_snake];

const PHARMACY_NAME_FIELDS: &[Accessor] = &[pharmacy_name, user_shop_name];

fn first_defined(raw: &RawSession, fields: &[Accessor]) -> Option<String> {
    fields.iter().find_map(|field| field(raw)).map(str::to_string)
}

/// Normalized view of the current user context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Option<String>,
    pub pharmacy_id: Option<String>,
    pub pharmacy_name: String,
    pub token: Option<String>,
}

impl Session {
    pub fn from_raw(raw: &RawSession) -> Self {
        Self {
            role: raw.role.clone(),
            pharmacy_id: first_defined(raw, PHARMACY_ID_FIELDS),
            pharmacy_name: first_defined(raw, PHARMACY_NAME_FIELDS)
                .unwrap_or_else(|| DEFAULT_PHARMACY_NAME.to_string()),
            token: raw.token.clone(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::from_raw(&RawSession::default())
    }
}

/// Read the raw record under [`SESSION_KEY`]; absent storage gives the empty
/// record.
pub fn read_raw_session(storage: &dyn SessionStorage) -> RawSession {
    match storage.get(SESSION_KEY) {
        Some(raw) => RawSession::parse(&raw),
        None => RawSession::default(),
    }
}

/// Read and normalize the current session.
pub fn read_session(storage: &dyn SessionStorage) -> Session {
    Session::from_raw(&read_raw_session(storage))
}
