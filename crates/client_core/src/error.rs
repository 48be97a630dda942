//! Failure taxonomy for catalog requests and form submission.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use shared::{domain::MovieField, error::ApiError};
use thiserror::Error;

const MAX_BODY_MESSAGE_CHARS: usize = 200;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never got an answer from the server.
    Network,
    /// The request was rejected and needs user correction.
    Client,
    /// The server failed while handling the request.
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request rejected ({status}): {message}")]
    Client { status: u16, message: String },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid {}: {message}", .field.label())]
    Validation { field: MovieField, message: String },
    #[error("a {0} request is already in flight")]
    Busy(&'static str),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Timeout(_) | CatalogError::Network(_) => ErrorKind::Network,
            CatalogError::NotFound(_)
            | CatalogError::Client { .. }
            | CatalogError::Validation { .. }
            | CatalogError::Busy(_)
            | CatalogError::Config(_) => ErrorKind::Client,
            CatalogError::Server { .. } | CatalogError::Decode(_) => ErrorKind::Server,
        }
    }

    /// Whether repeating the same request unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::Timeout(_) | CatalogError::Network(_) | CatalogError::Server { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }

    pub fn field(&self) -> Option<MovieField> {
        match self {
            CatalogError::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            CatalogError::Timeout(timeout)
        } else if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Network(err.to_string())
        }
    }

    /// Maps a non-success response to the taxonomy.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message_from_body(status, body);
        let code = status.as_u16();
        if status == StatusCode::NOT_FOUND {
            CatalogError::NotFound(message)
        } else if status.is_client_error() {
            CatalogError::Client {
                status: code,
                message,
            }
        } else {
            CatalogError::Server {
                status: code,
                message,
            }
        }
    }
}

fn error_message_from_body(status: StatusCode, body: &str) -> String {
    let body = body.trim();

    if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
        return api_error.message;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message", "detail"] {
            if let Some(Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }

    if !body.is_empty() {
        let mut message: String = body.chars().take(MAX_BODY_MESSAGE_CHARS).collect();
        if body.chars().count() > MAX_BODY_MESSAGE_CHARS {
            message.push('…');
        }
        return message;
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
