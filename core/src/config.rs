//! Endpoint and transport configuration

use std::time::Duration;

use crate::http::Headers;

/// Settings shared by the transports and the endpoint built on top of them.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Total time allowed for one request, body included
    pub timeout: Duration,

    /// Time allowed to establish the connection
    pub connect_timeout: Duration,

    /// User-Agent sent with every request
    pub user_agent: String,

    /// Headers applied to every request before the per-call configure
    /// callback runs
    pub default_headers: Headers,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("http-routines/{}", env!("CARGO_PKG_VERSION")),
            default_headers: Headers::new(),
        }
    }
}

impl EndpointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the total timeout in whole seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a header sent with every request
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.append(name, value);
        self
    }
}
