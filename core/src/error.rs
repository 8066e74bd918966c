//! Error types for endpoint calls.
//!
//! # Design
//! Only failures that prevent a response from existing live here. A non-2xx
//! status is not an error: it comes back as an ordinary `HttpResponse` and is
//! routed through `on_error`. Transport failures (connect, timeout, I/O) are
//! the `Err` side of the awaited call.

use thiserror::Error;

/// Errors returned by endpoint calls and by `HttpResponse::decode`.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The connection could not be established (refused, DNS, TLS).
    #[error("connection error: {0}")]
    Connect(String),

    /// The transport gave up waiting for the server.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Any other I/O or protocol failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request could not be built (bad URL, bad header name or value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to serialize request payload: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("failed to deserialize response body: {0}")]
    Deserialization(#[source] serde_json::Error),
}

/// Result alias used across the crate.
pub type HttpResult<T> = Result<T, HttpError>;

impl HttpError {
    /// True for failures of the network round-trip itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            HttpError::Connect(_) | HttpError::Timeout(_) | HttpError::Transport(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout(_))
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            HttpError::Connect(err.to_string())
        } else if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidRequest(err.to_string())
        } else {
            HttpError::Transport(err.to_string())
        }
    }
}

impl From<ureq::Error> for HttpError {
    fn from(err: ureq::Error) -> Self {
        match &err {
            ureq::Error::Timeout(_) => HttpError::Timeout(err.to_string()),
            ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
                HttpError::Connect(err.to_string())
            }
            ureq::Error::Io(io) if is_connect_io(io) => HttpError::Connect(err.to_string()),
            ureq::Error::Http(_) | ureq::Error::BadUri(_) => {
                HttpError::InvalidRequest(err.to_string())
            }
            _ => HttpError::Transport(err.to_string()),
        }
    }
}

fn is_connect_io(err: &std::io::Error) -> bool {
    use std::io::ErrorKind;
    matches!(
        err.kind(),
        ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset | ErrorKind::AddrNotAvailable
    )
}
