//! In-process stand-in for the Cloudflare waiting room events API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use waitflow_cloud_cloudflare::{CloudflareClient, CloudflareConfig};

pub const TEST_TOKEN: &str = "test-token";

type Reply = (StatusCode, Json<Value>);

#[derive(Default)]
struct Inner {
    /// Events keyed by `zone/room/id`
    events: Mutex<BTreeMap<String, Value>>,
    next_id: AtomicUsize,
    fail_reads: AtomicBool,
}

#[derive(Clone)]
pub struct MockCloudflare {
    pub base_url: String,
    inner: Arc<Inner>,
}

impl MockCloudflare {
    pub async fn start() -> Self {
        let inner = Arc::new(Inner::default());

        let app = Router::new()
            .route(
                "/zones/{zone}/waiting_rooms/{room}/events",
                get(list_events).post(create_event),
            )
            .route(
                "/zones/{zone}/waiting_rooms/{room}/events/{id}",
                get(get_event).put(update_event).delete(delete_event),
            )
            .with_state(inner.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            inner,
        }
    }

    pub fn client(&self) -> CloudflareClient {
        self.client_with_token(TEST_TOKEN)
    }

    pub fn client_with_token(&self, token: &str) -> CloudflareClient {
        CloudflareClient::new(CloudflareConfig::new(token).with_base_url(&self.base_url))
    }

    pub fn event_count(&self) -> usize {
        self.inner.events.lock().unwrap().len()
    }

    /// Make single-event reads answer with a server error
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }
}

fn ok(result: Value) -> Reply {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "errors": [], "messages": [], "result": result })),
    )
}

fn error(status: StatusCode, code: u32, message: &str) -> Reply {
    (
        status,
        Json(json!({
            "success": false,
            "errors": [{ "code": code, "message": message }],
            "messages": [],
            "result": null
        })),
    )
}

fn authorized(headers: &HeaderMap) -> Result<(), Reply> {
    let expected = format!("Bearer {}", TEST_TOKEN);
    match headers.get("authorization").and_then(|h| h.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(error(StatusCode::FORBIDDEN, 10000, "Authentication error")),
    }
}

fn not_found() -> Reply {
    error(StatusCode::NOT_FOUND, 1001, "event not found")
}

fn key(zone: &str, room: &str, id: &str) -> String {
    format!("{}/{}/{}", zone, room, id)
}

async fn create_event(
    State(inner): State<Arc<Inner>>,
    Path((zone, room)): Path<(String, String)>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }

    let id = format!("evt{:030}", inner.next_id.fetch_add(1, Ordering::SeqCst));
    body["id"] = json!(id);
    body["created_on"] = json!("2024-05-01T00:00:00.000Z");
    body["modified_on"] = json!("2024-05-01T00:00:00.000Z");

    inner
        .events
        .lock()
        .unwrap()
        .insert(key(&zone, &room, &id), body.clone());
    ok(body)
}

async fn list_events(
    State(inner): State<Arc<Inner>>,
    Path((zone, room)): Path<(String, String)>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }

    let prefix = format!("{}/{}/", zone, room);
    let events: Vec<Value> = inner
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|(k, _)| k.starts_with(&prefix))
        .map(|(_, v)| v.clone())
        .collect();
    ok(json!(events))
}

async fn get_event(
    State(inner): State<Arc<Inner>>,
    Path((zone, room, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    if inner.fail_reads.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, 1000, "Internal error");
    }

    match inner.events.lock().unwrap().get(&key(&zone, &room, &id)) {
        Some(event) => ok(event.clone()),
        None => not_found(),
    }
}

async fn update_event(
    State(inner): State<Arc<Inner>>,
    Path((zone, room, id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }

    let mut events = inner.events.lock().unwrap();
    let Some(existing) = events.get_mut(&key(&zone, &room, &id)) else {
        return not_found();
    };

    body["id"] = json!(id);
    body["created_on"] = existing["created_on"].clone();
    body["modified_on"] = json!("2024-05-02T00:00:00.000Z");
    *existing = body.clone();
    ok(body)
}

async fn delete_event(
    State(inner): State<Arc<Inner>>,
    Path((zone, room, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }

    match inner.events.lock().unwrap().remove(&key(&zone, &room, &id)) {
        Some(_) => ok(json!({ "id": id })),
        None => not_found(),
    }
}
