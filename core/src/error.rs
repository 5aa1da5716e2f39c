//! Error types for the pharmacy API client.
//!
//! # Design
//! A non-2xx response becomes `Status`, whose `Display` output is exactly the
//! message derived from the response (the body text, or `HTTP <status>` when
//! the body is empty). Callers surface that message to the user unchanged.
//! Session storage problems never show up here: the session reader degrades
//! them to an empty session.

use thiserror::Error;

/// Errors returned by `ApiClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status outside `200..=299`.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (DNS, connect, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// A success response declared JSON but its body did not parse, or the
    /// body could not be mapped onto the requested type.
    #[error("deserialization failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while resolving client configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base URL must not be empty")]
    EmptyBaseUrl,

    #[error("base URL must start with http:// or https://, got {0:?}")]
    UnsupportedScheme(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_bare_message() {
        let err = ApiError::Status {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn non_status_errors_have_no_status() {
        assert_eq!(ApiError::Transport("refused".to_string()).status(), None);
        assert_eq!(ApiError::Decode("eof".to_string()).status(), None);
    }
}
