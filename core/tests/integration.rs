//! End-to-end calls against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in its own thread and runtime,
//! then drives it through real endpoints over both transports. Covers the
//! CRUD lifecycle, the echo round-trip, header delivery, the non-2xx path,
//! transport failures and cancellation.

use std::time::Duration;

use http_routines::{Endpoint, EndpointConfig, HttpEndpoint, HttpError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Item {
    id: u64,
    name: String,
}

#[derive(Debug, Serialize)]
struct NewItem<'a> {
    name: &'a str,
}

/// Start the mock server on a random port and return its base URL.
fn spawn_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// A base URL nothing listens on.
fn refused_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn crud_lifecycle() {
    let endpoint = Endpoint::new(spawn_mock_server()).unwrap();

    // Step 1: list, should be empty.
    let items: Vec<Item> = endpoint.get("items", |_| {}).await.unwrap().decode().unwrap().unwrap();
    assert!(items.is_empty(), "expected empty list");

    // Step 2: create.
    let mut created = None;
    endpoint
        .post("items", &NewItem { name: "first" }, |_| {})
        .await
        .unwrap()
        .on_success::<Item, _>(|status, _, item| {
            assert_eq!(status, 201);
            created = item;
        })
        .on_error(|status, _| panic!("create failed with {status}"));
    let created = created.expect("created item");
    assert_eq!(created.name, "first");

    // Step 3: get.
    let fetched: Option<Item> = endpoint
        .get(&format!("items/{}", created.id), |_| {})
        .await
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(fetched, Some(created.clone()));

    // Step 4: update.
    let response = endpoint
        .put(&format!("items/{}", created.id), &NewItem { name: "renamed" }, |_| {})
        .await
        .unwrap();
    assert!(response.is_success());
    assert_eq!(response.decode::<Item>().unwrap().unwrap().name, "renamed");

    // Step 5: delete without payload gives 204 and no body.
    let response = endpoint
        .delete(&format!("items/{}", created.id), &(), |_| {})
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
    assert!(response.body().is_none());

    // Step 6: get after delete is a 404 routed to on_error.
    let mut missing = None;
    endpoint
        .get(&format!("items/{}", created.id), |_| {})
        .await
        .unwrap()
        .on_success::<Item, _>(|_, _, _| panic!("item should be gone"))
        .on_error(|status, _| missing = Some(status));
    assert_eq!(missing, Some(404));
}

#[tokio::test]
async fn payload_round_trips_through_echo() {
    let endpoint = Endpoint::new(spawn_mock_server()).unwrap();
    let payload = Item {
        id: 42,
        name: "échoé \"quoted\"".to_string(),
    };

    for response in [
        endpoint.post("echo", &payload, |_| {}).await.unwrap(),
        endpoint.put("echo", &payload, |_| {}).await.unwrap(),
        endpoint.delete("echo", &payload, |_| {}).await.unwrap(),
    ] {
        assert_eq!(response.decode::<Item>().unwrap(), Some(payload.clone()));
    }
}

#[tokio::test]
async fn headers_reach_the_server() {
    let config = EndpointConfig::new()
        .default_header("X-Client", "routines")
        .default_header("X-Trace", "default");
    let endpoint = Endpoint::with_config(spawn_mock_server(), config).unwrap();

    let response = endpoint
        .get("echo", |r| {
            r.set_header("X-Trace", "per-call").header("X-Extra", "1");
        })
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-echo-method"), Some("GET"));
    assert_eq!(headers.get("x-client"), Some("routines"));
    assert_eq!(headers.get_all("x-trace"), vec!["per-call"]);
    assert_eq!(headers.get("x-extra"), Some("1"));
    assert!(response.body().is_none(), "GET carries no body");
}

#[tokio::test]
async fn server_error_is_a_response_not_a_failure() {
    let endpoint = Endpoint::new(spawn_mock_server()).unwrap();

    let response = endpoint.post("status/503", &(), |_| {}).await.unwrap();
    assert_eq!(response.status(), 503);

    let mut fired = Vec::new();
    response
        .on_plain_success(|_, _, _| fired.push("success"))
        .on_error(|status, _| fired.push(if status == 503 { "error" } else { "other" }));
    assert_eq!(fired, vec!["error"]);
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    let endpoint = Endpoint::new(refused_base_url()).unwrap();

    let err = endpoint.get("items", |_| {}).await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn configured_timeout_surfaces_as_timeout_error() {
    let config = EndpointConfig::new().timeout(Duration::from_millis(100));
    let endpoint = Endpoint::with_config(spawn_mock_server(), config).unwrap();

    let err = endpoint.get("slow/2000", |_| {}).await.unwrap_err();
    assert!(matches!(err, HttpError::Timeout(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn caller_timeout_cancels_and_endpoint_stays_usable() {
    let endpoint = Endpoint::new(spawn_mock_server()).unwrap();

    let cancelled = tokio::time::timeout(Duration::from_millis(50), endpoint.get("slow/2000", |_| {})).await;
    assert!(cancelled.is_err(), "slow call should have been cancelled");

    let response = endpoint.get("items", |_| {}).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_calls_share_one_transport() {
    let endpoint = Endpoint::new(spawn_mock_server()).unwrap();

    let mut tasks = Vec::new();
    for n in 0..8 {
        let endpoint = endpoint.clone();
        tasks.push(tokio::spawn(async move {
            let name = format!("item-{n}");
            endpoint
                .post("items", &NewItem { name: &name }, |_| {})
                .await
                .unwrap()
                .status()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), 201);
    }

    let items: Vec<Item> = endpoint.get("items", |_| {}).await.unwrap().decode().unwrap().unwrap();
    assert_eq!(items.len(), 8);
}

#[tokio::test]
async fn blocking_transport_runs_the_same_calls() {
    let endpoint = Endpoint::blocking(spawn_mock_server(), EndpointConfig::default());

    let response = endpoint
        .post("items", &NewItem { name: "threaded" }, |_| {})
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let item: Item = response.decode().unwrap().unwrap();

    let echoed = endpoint
        .delete("echo", &item, |r| {
            r.header("X-Trace", "ureq");
        })
        .await
        .unwrap();
    assert_eq!(echoed.headers().get("x-echo-method"), Some("DELETE"));
    assert_eq!(echoed.headers().get("x-trace"), Some("ureq"));
    assert_eq!(echoed.decode::<Item>().unwrap(), Some(item));

    let missing = endpoint.get("items/999", |_| {}).await.unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn blocking_transport_refused_connection() {
    let endpoint = Endpoint::blocking(refused_base_url(), EndpointConfig::default());
    let err = endpoint.get("items", |_| {}).await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err:?}");
}
