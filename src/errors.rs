use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Common result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type that unifies transport failures, server-side rejections and
/// payload decoding problems.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never completed: connection refused, TLS, body read, etc.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success body that does not have the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// VoiceMode is switched off on the server at this base url.
    #[error("VoiceMode is not enabled on {0}")]
    Disabled(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the server error payload when this is a non-success response.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_))
    }
}

/// A non-2xx response, carrying the body the server sent back.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    /// Parsed JSON body, or the raw text as a JSON string if it wasn't JSON.
    pub body: Value,
}

impl ApiError {
    pub fn from_body(status: StatusCode, raw: &[u8]) -> Self {
        let body = serde_json::from_slice(raw)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(raw).into_owned()));
        Self { status, body }
    }

    /// The `detail` message FastAPI puts in its error bodies.
    pub fn detail(&self) -> Option<&str> {
        match &self.body {
            Value::Object(map) => map.get("detail").and_then(Value::as_str),
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "server returned {}: {}", self.status, detail),
            None => write!(f, "server returned {}: {}", self.status, self.body),
        }
    }
}

impl std::error::Error for ApiError {}
