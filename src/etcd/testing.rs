// etcd-dump/src/etcd/testing.rs
//! In-process stand-in for the etcd v2 keys API, used by the flow tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Default)]
struct FakeState {
    listing: Option<Value>,
    /// `None` marks a directory.
    keys: Mutex<BTreeMap<String, Option<String>>>,
    fail_on: Mutex<Option<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    writes: AtomicUsize,
}

pub(crate) struct FakeEtcd {
    addr: std::net::SocketAddr,
    state: Arc<FakeState>,
}

impl FakeEtcd {
    /// Serves `listing` on the recursive GET; without one the GET answers
    /// "Key not found".
    pub(crate) async fn start(listing: Option<Value>) -> anyhow::Result<Self> {
        let state = Arc::new(FakeState {
            listing,
            ..FakeState::default()
        });

        let app = Router::new()
            .route("/v2/keys/", get(get_tree))
            .route("/v2/keys/*key", put(put_key))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state })
    }

    pub(crate) fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(crate) fn fail_on(&self, key: &str) {
        *self.state.fail_on.lock().unwrap() = Some(key.to_string());
    }

    pub(crate) fn value(&self, key: &str) -> Option<Option<String>> {
        self.state.keys.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn keys(&self) -> BTreeMap<String, Option<String>> {
        self.state.keys.lock().unwrap().clone()
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn writes(&self) -> usize {
        self.state.writes.load(Ordering::SeqCst)
    }
}

async fn get_tree(State(state): State<Arc<FakeState>>) -> (StatusCode, Json<Value>) {
    match &state.listing {
        Some(listing) => (StatusCode::OK, Json(listing.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"errorCode": 100, "message": "Key not found", "cause": "/", "index": 1})),
        ),
    }
}

async fn put_key(
    State(state): State<Arc<FakeState>>,
    Path(key): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let key = format!("/{}", key);
    let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak.fetch_max(now, Ordering::SeqCst);
    state.writes.fetch_add(1, Ordering::SeqCst);

    tokio::time::sleep(Duration::from_millis(5)).await;
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    if state.fail_on.lock().unwrap().as_deref() == Some(key.as_str()) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"errorCode": 102, "message": "Not a file", "cause": key, "index": 1})),
        );
    }

    let value = if form.get("dir").map(String::as_str) == Some("true") {
        None
    } else {
        Some(form.get("value").cloned().unwrap_or_default())
    };
    state.keys.lock().unwrap().insert(key.clone(), value.clone());

    (
        StatusCode::CREATED,
        Json(json!({"action": "set", "node": {"key": key, "value": value, "dir": value.is_none()}})),
    )
}
