//! Normalized response wrapper with success/error branching.
//!
//! # Design
//! `HttpResponse` is an immutable snapshot taken after the transport has
//! buffered the whole body. The branching helpers inspect that snapshot
//! synchronously when they are called; they are not subscriptions. For any
//! response exactly one family fires: the success handlers for 200..=299,
//! `on_error` for everything else, whatever order they are chained in.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{HttpError, HttpResult};
use crate::http::{Headers, RawResponse};

/// Status, headers and body of a completed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    headers: Headers,
    body: Option<String>,
}

impl HttpResponse {
    pub fn new(status: u16, headers: Headers, body: Option<String>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Convert what a transport delivered. An empty body becomes `None`;
    /// invalid UTF-8 is replaced rather than rejected.
    pub fn from_raw(raw: RawResponse) -> Self {
        let body = if raw.body.is_empty() {
            None
        } else {
            Some(match String::from_utf8(raw.body) {
                Ok(text) => text,
                Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
            })
        };
        Self::new(raw.status, raw.headers, body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn into_body(self) -> Option<String> {
        self.body
    }

    /// True for status codes in 200..=299.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Parse the body as JSON.
    ///
    /// Returns `Ok(None)` when there is no body. Parse failures are returned,
    /// not swallowed.
    pub fn decode<T: DeserializeOwned>(&self) -> HttpResult<Option<T>> {
        match self.body.as_deref() {
            None => Ok(None),
            Some(body) => serde_json::from_str(body)
                .map(Some)
                .map_err(HttpError::Deserialization),
        }
    }

    /// Run `handler` with the decoded body if the status is 2xx.
    ///
    /// The value is `None` both for an absent body and for one that does not
    /// decode as `T`.
    pub fn on_success<T, F>(&self, handler: F) -> &Self
    where
        T: DeserializeOwned,
        F: FnOnce(u16, &Headers, Option<T>),
    {
        if self.is_success() {
            let value = self.decode::<T>().unwrap_or_else(|err| {
                debug!(status = self.status, error = %err, "success body did not decode");
                None
            });
            handler(self.status, &self.headers, value);
        }
        self
    }

    /// Run `handler` with the raw body text if the status is 2xx.
    pub fn on_plain_success<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(u16, &Headers, Option<&str>),
    {
        if self.is_success() {
            handler(self.status, &self.headers, self.body.as_deref());
        }
        self
    }

    /// Run `handler` if the status is outside 200..=299.
    pub fn on_error<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(u16, &Headers),
    {
        if !self.is_success() {
            handler(self.status, &self.headers);
        }
        self
    }
}
