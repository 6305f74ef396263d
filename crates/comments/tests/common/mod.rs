//! Shared mock comment backend for integration tests.
//!
//! A tiny axum app on an ephemeral port that records every request and
//! answers with whatever the test scripted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use kiosk_comments::api::CommentsApi;

/// Recorded traffic plus the scripted responses.
pub struct BackendState {
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub last_list_query: Mutex<Option<Vec<(String, String)>>>,
    pub last_create_body: Mutex<Option<Value>>,
    pub last_deleted: Mutex<Option<String>>,
    list_response: Mutex<(StatusCode, Value)>,
    create_status: Mutex<StatusCode>,
    delete_status: Mutex<StatusCode>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            last_list_query: Mutex::new(None),
            last_create_body: Mutex::new(None),
            last_deleted: Mutex::new(None),
            list_response: Mutex::new((StatusCode::OK, json!({ "comments": [] }))),
            create_status: Mutex::new(StatusCode::OK),
            delete_status: Mutex::new(StatusCode::OK),
        }
    }
}

impl BackendState {
    pub fn set_list_response(&self, status: StatusCode, body: Value) {
        *self.list_response.lock().unwrap() = (status, body);
    }

    pub fn set_create_status(&self, status: StatusCode) {
        *self.create_status.lock().unwrap() = status;
    }

    pub fn set_delete_status(&self, status: StatusCode) {
        *self.delete_status.lock().unwrap() = status;
    }

    /// Value of one parameter from the most recent list request.
    pub fn list_param(&self, name: &str) -> Option<String> {
        self.last_list_query
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|params| {
                params
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.clone())
            })
    }
}

pub struct MockBackend {
    pub state: Arc<BackendState>,
    pub base_url: String,
}

impl MockBackend {
    pub fn api(&self) -> CommentsApi {
        CommentsApi::new(self.base_url.clone())
    }
}

pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(BackendState::default());
    let app = Router::new()
        .route("/comments", get(list_comments).post(create_comment))
        .route("/comments/{id}", delete(delete_comment))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        state,
        base_url: format!("http://{addr}"),
    }
}

// ---------- Handlers ----------

async fn list_comments(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> (StatusCode, Json<Value>) {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_list_query.lock().unwrap() = Some(params);

    let (status, body) = state.list_response.lock().unwrap().clone();
    (status, Json(body))
}

async fn create_comment(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.create_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_create_body.lock().unwrap() = Some(body);

    let status = *state.create_status.lock().unwrap();
    if status.is_success() {
        (status, Json(json!({ "message": "Comment created" })))
    } else {
        (status, Json(json!({ "error": "creation rejected" })))
    }
}

async fn delete_comment(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    state.delete_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_deleted.lock().unwrap() = Some(id);

    let status = *state.delete_status.lock().unwrap();
    if status.is_success() {
        (status, Json(json!({ "message": "Comment deleted" })))
    } else {
        (status, Json(json!({ "error": "delete rejected" })))
    }
}
