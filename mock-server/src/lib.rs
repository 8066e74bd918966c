use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct NewItem {
    pub name: String,
}

#[derive(Default)]
pub struct Db {
    items: RwLock<BTreeMap<u64, Item>>,
    next_id: AtomicU64,
}

pub type SharedDb = Arc<Db>;

pub fn app() -> Router {
    let db: SharedDb = Arc::new(Db::default());
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item).put(update_item).delete(delete_item))
        .route("/echo", any(echo))
        .route("/status/{code}", any(fixed_status))
        .route("/slow/{millis}", get(slow))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Parse a JSON body without insisting on a Content-Type header.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, StatusCode> {
    serde_json::from_slice(body).map_err(|_| StatusCode::BAD_REQUEST)
}

async fn list_items(State(db): State<SharedDb>) -> Json<Vec<Item>> {
    let items = db.items.read().await;
    Json(items.values().cloned().collect())
}

async fn create_item(
    State(db): State<SharedDb>,
    body: Bytes,
) -> Result<(StatusCode, Json<Item>), StatusCode> {
    let input: NewItem = parse_json(&body)?;
    let item = Item {
        id: db.next_id.fetch_add(1, Ordering::Relaxed) + 1,
        name: input.name,
    };
    db.items.write().await.insert(item.id, item.clone());
    debug!(id = item.id, "created item");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
) -> Result<Json<Item>, StatusCode> {
    let items = db.items.read().await;
    items.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_item(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
    body: Bytes,
) -> Result<Json<Item>, StatusCode> {
    let input: NewItem = parse_json(&body)?;
    let mut items = db.items.write().await;
    let item = items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    item.name = input.name;
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut items = db.items.write().await;
    items.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

/// Reply 200 with the request body unchanged. The method comes back in
/// `x-echo-method` and every `x-*` request header is mirrored.
async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let mut reply = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(method.as_str()) {
        reply.insert(HeaderName::from_static("x-echo-method"), value);
    }
    for (name, value) in headers.iter() {
        if name.as_str().starts_with("x-") {
            reply.append(name.clone(), value.clone());
        }
    }
    (StatusCode::OK, reply, body)
}

async fn fixed_status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn slow(Path(millis): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    "done"
}
