use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{trace, warn};

use super::{Call, Completion, Transport};
use crate::config::EndpointConfig;
use crate::error::HttpResult;
use crate::http::{Headers, Method, RawResponse, Request};

/// Blocking transport: every call runs on its own OS thread through a shared
/// `ureq::Agent`.
///
/// ureq cannot interrupt a request mid-flight, so cancelling only guarantees
/// that the completion callback is never invoked. The thread itself finishes
/// the round-trip (bounded by the configured timeouts) and discards the
/// outcome.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(config: &EndpointConfig) -> Self {
        // Non-2xx statuses are data, not errors.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .timeout_connect(Some(config.connect_timeout))
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Transport for UreqTransport {
    fn enqueue(&self, request: Request, completion: Completion) -> Box<dyn Call> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();

        let spawned = thread::Builder::new()
            .name("http-routines-call".to_string())
            .spawn(move || {
                let outcome = execute(&agent, &user_agent, request);
                if flag.load(Ordering::Acquire) {
                    trace!("discarding outcome of cancelled call");
                    return;
                }
                completion(outcome);
            });
        // On failure the completion is dropped with the closure and the
        // awaiting side observes a transport error.
        if let Err(err) = spawned {
            warn!(error = %err, "failed to spawn request thread");
        }

        Box::new(FlagCall { cancelled })
    }
}

struct FlagCall {
    cancelled: Arc<AtomicBool>,
}

impl Call for FlagCall {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    user_agent: &str,
    headers: &Headers,
) -> ureq::RequestBuilder<B> {
    if !headers.contains("user-agent") {
        builder = builder.header("User-Agent", user_agent);
    }
    for (name, value) in headers.iter() {
        builder = builder.header(name, value);
    }
    builder
}

fn execute(agent: &ureq::Agent, user_agent: &str, request: Request) -> HttpResult<RawResponse> {
    let url = request.url.as_str();
    let headers = &request.headers;

    let mut response = match (request.method, request.body.as_deref()) {
        (Method::Get, _) => with_headers(agent.get(url), user_agent, headers).call(),
        (Method::Delete, Some(body)) => with_headers(agent.delete(url), user_agent, headers)
            .force_send_body()
            .send(body.as_bytes()),
        (Method::Delete, None) => with_headers(agent.delete(url), user_agent, headers).call(),
        (Method::Post, Some(body)) => {
            with_headers(agent.post(url), user_agent, headers).send(body.as_bytes())
        }
        (Method::Post, None) => with_headers(agent.post(url), user_agent, headers).send_empty(),
        (Method::Put, Some(body)) => {
            with_headers(agent.put(url), user_agent, headers).send(body.as_bytes())
        }
        (Method::Put, None) => with_headers(agent.put(url), user_agent, headers).send_empty(),
    }?;

    let status = response.status().as_u16();
    let headers = Headers::from_header_map(response.headers());
    // ureq caps `read_to_vec` at 10 MiB unless told otherwise.
    let body = response.body_mut().with_config().limit(u64::MAX).read_to_vec()?;

    Ok(RawResponse {
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn refused_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/items")
    }

    #[test]
    fn refused_connection_reaches_the_callback() {
        let transport = UreqTransport::new(&EndpointConfig::default());
        let (tx, rx) = std::sync::mpsc::channel();
        let request = Request {
            method: Method::Get,
            url: refused_url(),
            headers: Headers::new(),
            body: None,
        };

        let _call = transport.enqueue(request, Box::new(move |outcome| {
            tx.send(outcome).unwrap();
        }));

        let outcome = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        let err = outcome.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err:?}");
    }

    #[test]
    fn cancelled_call_never_invokes_the_callback() {
        // Accepts connections into the backlog but never answers them.
        let silent = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = silent.local_addr().unwrap();

        let config = EndpointConfig::new().timeout(Duration::from_millis(500));
        let transport = UreqTransport::new(&config);
        let (tx, rx) = std::sync::mpsc::channel::<HttpResult<RawResponse>>();
        let request = Request {
            method: Method::Post,
            url: format!("http://{addr}/items"),
            headers: Headers::new(),
            body: Some("null".to_string()),
        };

        let call = transport.enqueue(request, Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }));
        call.cancel();

        // The sender is dropped with the discarded completion once the
        // request times out.
        let received = rx.recv_timeout(Duration::from_secs(10));
        assert!(matches!(received, Err(std::sync::mpsc::RecvTimeoutError::Disconnected)));
        drop(silent);
    }
}
