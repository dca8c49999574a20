//! Errors returned by the REST client

use reqwest::StatusCode;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// JSON body the backend attaches to failed requests.
///
/// Post endpoints use `error`, auth endpoints use `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    /// Error text from post endpoints
    #[serde(default)]
    pub error: Option<String>,
    /// Error text from auth endpoints
    #[serde(default)]
    pub message: Option<String>,
}

/// Failure talking to the backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or decoding failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status. `body` is `None` when the body was not JSON.
    #[error("server responded with {status}")]
    Status {
        /// HTTP status code
        status: StatusCode,
        /// Parsed error body, if any
        body: Option<ErrorBody>,
    },

    /// Attached media file could not be read
    #[error("could not read media file {}: {source}", .path.display())]
    Media {
        /// File that was attached
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl ApiError {
    /// Server-provided `error` field, if the server sent one
    pub fn server_error(&self) -> Option<&str> {
        match self {
            Self::Status {
                body: Some(body), ..
            } => body.error.as_deref().filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Server-provided `message` field, if the server sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                body: Some(body), ..
            } => body.message.as_deref().filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Whether the server answered with a readable JSON error body
    pub const fn has_error_body(&self) -> bool {
        matches!(self, Self::Status { body: Some(_), .. })
    }
}
