use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::helpers::time::now_rfc3339;

/// Error envelope reported by the backend, consumed verbatim.
///
/// The backend emits `{statusCode, message, timestamp, path}` on every
/// non-2xx response; `message` is a single string or a list of validation
/// messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("api error {status_code} at {path}: {message}")]
pub struct ApiError {
    pub status_code: u16,
    pub message: ErrorMessage,
    pub timestamp: String,
    pub path: String,
}

impl ApiError {
    /// Minimal error synthesized when a non-2xx response carries no parseable
    /// error body.
    pub fn from_status(status: u16, path: &str) -> Self {
        let reason = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown error");
        Self {
            status_code: status,
            message: ErrorMessage::One(reason.to_owned()),
            timestamp: now_rfc3339(),
            path: path.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMessage::One(msg) => f.write_str(msg),
            ErrorMessage::Many(msgs) => f.write_str(&msgs.join("; ")),
        }
    }
}

/// Failure taxonomy of the request executor.
///
/// `Timeout` and `Cancelled` mean the call was given up locally before the
/// backend answered; `Api` means the backend answered and said no. Callers
/// that retry with backoff should do so only for the former.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request was cancelled")]
    Cancelled,

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Status code of the backend-reported error, if this is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Api(err) => Some(err.status_code),
            _ => None,
        }
    }
}
