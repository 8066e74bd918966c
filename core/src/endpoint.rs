//! Verb methods against a base URL.
//!
//! # Design
//! `HttpEndpoint` is the capability: an implementor names a base URL and a
//! transport, and gets `get`/`post`/`put`/`delete` for free. `Endpoint` is
//! the ready-made implementation holding both by composition; concrete API
//! surfaces usually wrap one and delegate to it.
//!
//! Every verb issues exactly one transport call and never retries. A non-2xx
//! status is an `Ok(HttpResponse)`; only transport failures (and payloads
//! that cannot be serialized) are `Err`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::bridge;
use crate::builder::RequestBuilder;
use crate::config::EndpointConfig;
use crate::error::{HttpError, HttpResult};
use crate::http::{Headers, Method, Request};
use crate::response::HttpResponse;
use crate::transport::{ReqwestTransport, Transport, UreqTransport};

static NO_HEADERS: Headers = Headers::new();

/// An API surface rooted at one base URL.
///
/// Paths are joined as `{base_url}/{path}` with no normalization, so callers
/// avoid leading slashes on `path` and trailing slashes on the base.
///
/// Payloads are serialized with `serde_json`. Pass `&()` to send no payload:
/// POST, PUT and DELETE then carry the JSON `null` body. GET never has a body.
#[async_trait]
pub trait HttpEndpoint: Send + Sync {
    fn base_url(&self) -> &str;

    fn transport(&self) -> &dyn Transport;

    /// Headers applied to every request before the configure callback.
    fn default_headers(&self) -> &Headers {
        &NO_HEADERS
    }

    async fn get<F>(&self, path: &str, configure: F) -> HttpResult<HttpResponse>
    where
        F: FnOnce(&mut RequestBuilder) + Send,
    {
        let request = prepare(self, Method::Get, path, None, configure);
        self.send(request).await
    }

    async fn delete<P, F>(&self, path: &str, payload: &P, configure: F) -> HttpResult<HttpResponse>
    where
        P: Serialize + ?Sized + Sync,
        F: FnOnce(&mut RequestBuilder) + Send,
    {
        let body = to_json(payload)?;
        let request = prepare(self, Method::Delete, path, Some(body), configure);
        self.send(request).await
    }

    async fn post<P, F>(&self, path: &str, payload: &P, configure: F) -> HttpResult<HttpResponse>
    where
        P: Serialize + ?Sized + Sync,
        F: FnOnce(&mut RequestBuilder) + Send,
    {
        let body = to_json(payload)?;
        let request = prepare(self, Method::Post, path, Some(body), configure);
        self.send(request).await
    }

    async fn put<P, F>(&self, path: &str, payload: &P, configure: F) -> HttpResult<HttpResponse>
    where
        P: Serialize + ?Sized + Sync,
        F: FnOnce(&mut RequestBuilder) + Send,
    {
        let body = to_json(payload)?;
        let request = prepare(self, Method::Put, path, Some(body), configure);
        self.send(request).await
    }

    /// Dispatch a fully built request and wrap the outcome.
    async fn send(&self, request: Request) -> HttpResult<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let raw = bridge::execute(self.transport(), request).await?;
        let response = HttpResponse::from_raw(raw);
        debug!(status = response.status(), "request completed");
        Ok(response)
    }
}

fn to_json<P: Serialize + ?Sized>(payload: &P) -> HttpResult<String> {
    serde_json::to_string(payload).map_err(HttpError::Serialization)
}

fn prepare<E, F>(
    endpoint: &E,
    method: Method,
    path: &str,
    body: Option<String>,
    configure: F,
) -> Request
where
    E: HttpEndpoint + ?Sized,
    F: FnOnce(&mut RequestBuilder),
{
    let url = format!("{}/{}", endpoint.base_url(), path);
    let mut builder = RequestBuilder::new(method, url)
        .with_headers(endpoint.default_headers().clone())
        .with_body(body);
    configure(&mut builder);
    builder.build()
}

/// Base URL plus a shared transport.
///
/// Cloning is cheap and every clone issues requests through the same
/// transport.
#[derive(Debug)]
pub struct Endpoint<T = ReqwestTransport> {
    base_url: String,
    transport: Arc<T>,
    default_headers: Headers,
}

impl<T> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: Arc::clone(&self.transport),
            default_headers: self.default_headers.clone(),
        }
    }
}

impl Endpoint<ReqwestTransport> {
    pub fn new(base_url: impl Into<String>) -> HttpResult<Self> {
        Self::with_config(base_url, EndpointConfig::default())
    }

    pub fn with_config(base_url: impl Into<String>, config: EndpointConfig) -> HttpResult<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self {
            base_url: base_url.into(),
            transport: Arc::new(transport),
            default_headers: config.default_headers,
        })
    }
}

impl Endpoint<UreqTransport> {
    /// Endpoint whose calls run on blocking threads instead of tokio tasks.
    pub fn blocking(base_url: impl Into<String>, config: EndpointConfig) -> Self {
        let transport = UreqTransport::new(&config);
        Self {
            base_url: base_url.into(),
            transport: Arc::new(transport),
            default_headers: config.default_headers,
        }
    }
}

impl<T: Transport> Endpoint<T> {
    pub fn with_transport(base_url: impl Into<String>, transport: Arc<T>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            default_headers: Headers::new(),
        }
    }

    /// Add a header sent with every request from this endpoint.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.append(name, value);
        self
    }

    pub fn shared_transport(&self) -> &Arc<T> {
        &self.transport
    }
}

#[async_trait]
impl<T: Transport> HttpEndpoint for Endpoint<T> {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport(&self) -> &dyn Transport {
        &*self.transport
    }

    fn default_headers(&self) -> &Headers {
        &self.default_headers
    }
}
