//! In-process stand-in for a jsonplaceholder-style backend.
//!
//! Serves the six collections with a fixed number of canned resources per
//! collection. In [`Mode::Echo`] it behaves like the real service: write
//! verbs are acknowledged and echoed but nothing is stored. [`Mode::Persisting`]
//! actually applies writes, which is exactly the behavior the harness is
//! supposed to flag.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Resources per collection; the next unallocated id is `RESOURCE_COUNT + 1`.
pub const RESOURCE_COUNT: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Acknowledge and echo writes without storing them (the contract the
    /// harness verifies).
    Echo,
    /// Actually apply writes, so follow-up reads observe them.
    Persisting,
}

struct MockState {
    mode: Mode,
    /// Overrides applied in persisting mode. `None` marks a deleted id.
    stored: Mutex<HashMap<String, Option<Value>>>,
}

/// Route harness logs to the test writer. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Bind to an ephemeral port and serve until the test binary exits.
pub async fn spawn(mode: Mode) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(MockState {
        mode,
        stored: Mutex::new(HashMap::new()),
    });

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let io = TokioIo::new(stream);
            let state = Arc::clone(&state);

            tokio::spawn(async move {
                let service = service_fn(move |req| handle(req, Arc::clone(&state)));
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    eprintln!("mock backend connection error: {err}");
                }
            });
        }
    });

    addr
}

async fn handle(
    req: Request<Incoming>,
    state: Arc<MockState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().trim_matches('/').to_string();
    let payload: Option<Value> = match req.into_body().collect().await {
        Ok(collected) => serde_json::from_slice(&collected.to_bytes()).ok(),
        Err(_) => None,
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let response = match (method, segments.as_slice()) {
        (Method::GET, [collection]) => {
            let items: Vec<Value> = (1..=RESOURCE_COUNT).map(|id| item(collection, id)).collect();
            json_response(StatusCode::OK, &Value::Array(items))
        }
        (Method::GET, [collection, id]) => get_resource(&state, collection, id),
        (Method::POST, [collection]) => {
            let id = RESOURCE_COUNT + 1;
            let body = merge(json!({ "id": id }), payload);
            if state.mode == Mode::Persisting {
                remember(&state, collection, id, Some(body.clone()));
            }
            json_response(StatusCode::CREATED, &body)
        }
        (Method::PUT, [collection, id]) => {
            let Ok(id) = id.parse::<u64>() else {
                return Ok(not_found());
            };
            let body = merge(json!({ "id": id }), payload);
            if state.mode == Mode::Persisting {
                remember(&state, collection, id, Some(body.clone()));
            }
            json_response(StatusCode::OK, &body)
        }
        (Method::PATCH, [collection, id]) => {
            let Ok(id) = id.parse::<u64>() else {
                return Ok(not_found());
            };
            let body = merge(current(&state, collection, id), payload);
            if state.mode == Mode::Persisting {
                remember(&state, collection, id, Some(body.clone()));
            }
            json_response(StatusCode::OK, &body)
        }
        (Method::DELETE, [collection, id]) => {
            let Ok(id) = id.parse::<u64>() else {
                return Ok(not_found());
            };
            if state.mode == Mode::Persisting {
                remember(&state, collection, id, None);
            }
            json_response(StatusCode::OK, &json!({}))
        }
        _ => not_found(),
    };

    Ok(response)
}

fn get_resource(state: &MockState, collection: &str, id: &str) -> Response<Full<Bytes>> {
    let Ok(id) = id.parse::<u64>() else {
        return not_found();
    };

    if state.mode == Mode::Persisting {
        let stored = state.stored.lock().unwrap();
        match stored.get(&key(collection, id)) {
            Some(Some(body)) => return json_response(StatusCode::OK, body),
            Some(None) => return not_found(),
            None => {}
        }
    }

    if (1..=RESOURCE_COUNT).contains(&id) {
        json_response(StatusCode::OK, &item(collection, id))
    } else {
        not_found()
    }
}

fn item(collection: &str, id: u64) -> Value {
    json!({
        "userId": 1,
        "id": id,
        "title": format!("{collection} title {id}"),
        "body": format!("{collection} body {id}"),
    })
}

fn current(state: &MockState, collection: &str, id: u64) -> Value {
    if state.mode == Mode::Persisting {
        let stored = state.stored.lock().unwrap();
        if let Some(Some(body)) = stored.get(&key(collection, id)) {
            return body.clone();
        }
    }
    item(collection, id)
}

fn merge(mut base: Value, overlay: Option<Value>) -> Value {
    if let (Value::Object(base_map), Some(Value::Object(overlay_map))) = (&mut base, overlay) {
        for (k, v) in overlay_map {
            base_map.insert(k, v);
        }
    }
    base
}

fn remember(state: &MockState, collection: &str, id: u64, body: Option<Value>) {
    state
        .stored
        .lock()
        .unwrap()
        .insert(key(collection, id), body);
}

fn key(collection: &str, id: u64) -> String {
    format!("{collection}/{id}")
}

fn json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

fn not_found() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Full::new(Bytes::from("{}")))
        .unwrap()
}
