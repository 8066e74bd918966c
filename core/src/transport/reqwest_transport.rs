use reqwest::Client;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

use super::{Call, CompletedCall, Completion, Transport};
use crate::config::EndpointConfig;
use crate::error::{HttpError, HttpResult};
use crate::http::{Headers, RawResponse, Request};

/// Async transport: every call runs as its own task on the caller's tokio
/// runtime, and cancelling the call aborts that task.
///
/// The wrapped `reqwest::Client` pools connections and is cheap to clone, so
/// one transport can serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &EndpointConfig) -> HttpResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn enqueue(&self, request: Request, completion: Completion) -> Box<dyn Call> {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                completion(Err(HttpError::Transport(format!(
                    "no tokio runtime available for the call: {err}"
                ))));
                return Box::new(CompletedCall);
            }
        };

        trace!(method = %request.method, url = %request.url, "spawning request task");
        let client = self.client.clone();
        let task = runtime.spawn(async move {
            let outcome = dispatch(&client, request).await;
            completion(outcome);
        });
        Box::new(TaskCall { task })
    }
}

struct TaskCall {
    task: JoinHandle<()>,
}

impl Call for TaskCall {
    fn cancel(&self) {
        self.task.abort();
    }
}

/// Send the request and buffer the whole body before returning, so the
/// connection is released before anyone looks at the response.
async fn dispatch(client: &Client, request: Request) -> HttpResult<RawResponse> {
    let mut builder = client.request(request.method.into(), request.url.as_str());
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let headers = Headers::from_header_map(response.headers());
    let body = response.bytes().await?.to_vec();

    Ok(RawResponse {
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    #[test]
    fn enqueue_without_runtime_fails_the_call() {
        let transport = ReqwestTransport::new(&EndpointConfig::default()).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        let request = Request {
            method: Method::Get,
            url: "http://127.0.0.1:1/".to_string(),
            headers: Headers::new(),
            body: None,
        };

        let call = transport.enqueue(request, Box::new(move |outcome| {
            tx.send(outcome).unwrap();
        }));
        call.cancel();

        let outcome = rx.recv().unwrap();
        assert!(matches!(outcome, Err(HttpError::Transport(_))));
    }
}
