//! Mutable request context handed to per-call configure callbacks.

use crate::http::{Headers, Method, Request};

/// A request under construction.
///
/// Endpoints create one with the method, the joined URL, the default headers
/// and the serialized payload already filled in, then pass it to the caller's
/// configure closure so headers can be declared inline:
///
/// ```ignore
/// endpoint
///     .get("items", |r| {
///         r.header("Accept", "application/json").bearer_auth(&token);
///     })
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: String,
    headers: Headers,
    body: Option<String>,
}

impl RequestBuilder {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub(crate) fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub(crate) fn with_body(mut self, body: Option<String>) -> Self {
        self.body = body;
        self
    }

    /// Append a header value.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.append(name, value);
        self
    }

    /// Replace every value of a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.headers.remove(name);
        self
    }

    pub fn bearer_auth(&mut self, token: impl AsRef<str>) -> &mut Self {
        self.set_header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    pub fn content_type(&mut self, value: impl Into<String>) -> &mut Self {
        self.set_header("Content-Type", value)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}
