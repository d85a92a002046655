//! Upstream client errors
//!
//! Failures are classified the same way for every endpoint so callers can
//! decide how to surface them without inspecting HTTP details.

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Timeout,
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Server,
    Unknown,
}

impl ErrorKind {
    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::Validation,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            500 | 502 | 503 | 504 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Worth another attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Server)
    }
}

/// Errors that can occur when talking to the disease backend
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        kind: ErrorKind,
        message: String,
    },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Timeout => ErrorKind::Timeout,
            ClientError::Api { kind, .. } => *kind,
            ClientError::Decode(_) | ClientError::Config(_) => ErrorKind::Unknown,
        }
    }

    /// Build an API error from a non-success response body
    pub fn from_response(status: u16, body: &str) -> Self {
        ClientError::Api {
            status,
            kind: ErrorKind::from_status(status),
            message: extract_message(body).unwrap_or_else(|| format!("HTTP {}", status)),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

/// Pull a human-readable message out of a JSON error body
///
/// Accepts `{"message": ...}`, `{"error": "..."}` and the nested
/// `{"error": {"message": ...}}` shape.
pub fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(msg) = value.get("message").and_then(|m| m.as_str()) {
        return Some(msg.to_string());
    }
    match value.get("error") {
        Some(serde_json::Value::String(msg)) => Some(msg.clone()),
        Some(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        None => None,
    }
}
