//! A concrete API surface built on `http-routines`.
//!
//! `DemoEndpoint` talks to the mock server's `/items` routes. It shows the
//! intended usage: headers declared inline per call, typed decoding through
//! `on_success`, and non-2xx statuses routed through `on_error` rather than
//! surfacing as transport failures.

use async_trait::async_trait;
use http_routines::{Endpoint, EndpointConfig, Headers, HttpEndpoint, HttpError, Transport};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
struct NewItem<'a> {
    name: &'a str,
}

#[derive(Debug, Error)]
pub enum DemoError {
    /// The call never produced a response.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The server answered outside 200..=299.
    #[error("server answered with status {0}")]
    Status(u16),

    /// The server answered 2xx but the body was missing or not an item.
    #[error("response body was empty or malformed")]
    EmptyBody,
}

pub type DemoResult<T> = Result<T, DemoError>;

/// Items API of the mock server.
#[derive(Debug, Clone)]
pub struct DemoEndpoint {
    inner: Endpoint,
}

impl DemoEndpoint {
    pub fn new(base_url: impl Into<String>) -> DemoResult<Self> {
        let config = EndpointConfig::new().default_header("Accept", "application/json");
        Ok(Self {
            inner: Endpoint::with_config(base_url, config)?,
        })
    }

    pub async fn list_items(&self) -> DemoResult<Vec<Item>> {
        let mut outcome = Err(DemoError::EmptyBody);
        self.get("items", |_| {})
            .await?
            .on_success::<Vec<Item>, _>(|_, _, items| {
                outcome = items.ok_or(DemoError::EmptyBody);
            })
            .on_error(|status, _| outcome = Err(DemoError::Status(status)));
        outcome
    }

    pub async fn create_item(&self, name: &str) -> DemoResult<Item> {
        let mut outcome = Err(DemoError::EmptyBody);
        self.post("items", &NewItem { name }, |r| {
            r.content_type("application/json");
        })
        .await?
        .on_success::<Item, _>(|status, _, item| {
            info!(status, "item created");
            outcome = item.ok_or(DemoError::EmptyBody);
        })
        .on_error(|status, _| {
            warn!(status, "item creation rejected");
            outcome = Err(DemoError::Status(status));
        });
        outcome
    }

    pub async fn rename_item(&self, id: u64, name: &str) -> DemoResult<Item> {
        let response = self
            .put(&format!("items/{id}"), &NewItem { name }, |r| {
                r.content_type("application/json");
            })
            .await?;
        if !response.is_success() {
            return Err(DemoError::Status(response.status()));
        }
        response.decode()?.ok_or(DemoError::EmptyBody)
    }

    /// Delete an item. Returns `false` when it did not exist.
    pub async fn delete_item(&self, id: u64) -> DemoResult<bool> {
        let response = self.delete(&format!("items/{id}"), &(), |_| {}).await?;
        match response.status() {
            404 => Ok(false),
            _ if response.is_success() => Ok(true),
            status => Err(DemoError::Status(status)),
        }
    }

    /// Create one item and return the listing as text, or an empty string
    /// when either call did not succeed.
    pub async fn summary(&self, name: &str) -> DemoResult<String> {
        let mut text = String::new();
        self.post("items", &NewItem { name }, |_| {})
            .await?
            .on_error(|status, _| warn!(status, "create failed"));
        self.get("items", |r| {
            r.header("X-Demo", "summary");
        })
        .await?
        .on_error(|_, _| text.clear())
        .on_plain_success(|_, _, body| text = body.unwrap_or_default().to_string());
        Ok(text)
    }
}

#[async_trait]
impl HttpEndpoint for DemoEndpoint {
    fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    fn transport(&self) -> &dyn Transport {
        self.inner.transport()
    }

    fn default_headers(&self) -> &Headers {
        self.inner.default_headers()
    }
}
