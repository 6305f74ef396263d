//! Shared mock image backend for integration tests.
//!
//! A tiny axum app on an ephemeral port. Uploads hand out fresh ids;
//! status probes replay a script the test provides, repeating the last
//! step once the script runs out.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use kiosk_imaging::api::ImagingApi;
use kiosk_imaging::poller::PollConfig;
use kiosk_imaging::session::JobSession;

/// One scripted answer for a status probe.
#[derive(Clone)]
pub enum ProbeStep {
    /// JSON status envelope with this status word.
    Status(&'static str),
    /// Artifact bytes served with this content type.
    Artifact(&'static str, Vec<u8>),
    /// Failure answer: HTTP status plus error envelope message.
    Error(u16, &'static str),
}

/// What the mock saw in the multipart upload.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub file_name: Option<String>,
    pub file_len: usize,
    pub operations: Option<Value>,
}

/// Recorded traffic plus the scripted responses.
pub struct BackendState {
    pub upload_calls: AtomicUsize,
    pub probe_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub last_upload: Mutex<Option<UploadRecord>>,
    pub probed_ids: Mutex<Vec<String>>,
    pub last_deleted: Mutex<Option<String>>,
    probe_script: Mutex<VecDeque<ProbeStep>>,
    upload_status: Mutex<StatusCode>,
    delete_status: Mutex<StatusCode>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            upload_calls: AtomicUsize::new(0),
            probe_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            last_upload: Mutex::new(None),
            probed_ids: Mutex::new(Vec::new()),
            last_deleted: Mutex::new(None),
            probe_script: Mutex::new(VecDeque::new()),
            upload_status: Mutex::new(StatusCode::OK),
            delete_status: Mutex::new(StatusCode::OK),
        }
    }
}

impl BackendState {
    pub fn script_probes(&self, steps: Vec<ProbeStep>) {
        *self.probe_script.lock().unwrap() = steps.into();
    }

    pub fn set_upload_status(&self, status: StatusCode) {
        *self.upload_status.lock().unwrap() = status;
    }

    pub fn set_delete_status(&self, status: StatusCode) {
        *self.delete_status.lock().unwrap() = status;
    }
}

pub struct MockBackend {
    pub state: Arc<BackendState>,
    pub base_url: String,
}

impl MockBackend {
    pub fn api(&self) -> ImagingApi {
        ImagingApi::new(self.base_url.clone())
    }

    /// A session polling this backend at the given cadence.
    pub fn session(&self, interval: Duration) -> JobSession {
        JobSession::with_config(self.api(), PollConfig { interval })
    }
}

pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(BackendState::default());
    let app = Router::new()
        .route("/upload", post(upload))
        .route("/image/{id}", get(probe).delete(delete_image))
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

async fn upload(
    State(state): State<Arc<BackendState>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    state.upload_calls.fetch_add(1, Ordering::SeqCst);

    let mut file_name = None;
    let mut file_len = 0;
    let mut operations = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(str::to_string);
                file_len = field.bytes().await.unwrap().len();
            }
            "operations" => {
                operations = serde_json::from_str(&field.text().await.unwrap()).ok();
            }
            _ => {}
        }
    }
    *state.last_upload.lock().unwrap() = Some(UploadRecord {
        file_name,
        file_len,
        operations,
    });

    let status = *state.upload_status.lock().unwrap();
    if status.is_success() {
        let image_id = uuid::Uuid::new_v4().to_string();
        (status, Json(json!({ "image_id": image_id })))
    } else {
        (status, Json(json!({ "error": "upload rejected" })))
    }
}

async fn probe(State(state): State<Arc<BackendState>>, Path(id): Path<String>) -> Response {
    state.probe_calls.fetch_add(1, Ordering::SeqCst);
    state.probed_ids.lock().unwrap().push(id);

    let step = {
        let mut script = state.probe_script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script
                .front()
                .cloned()
                .unwrap_or(ProbeStep::Status("pending"))
        }
    };

    match step {
        ProbeStep::Status(word) => {
            (StatusCode::OK, Json(json!({ "status": word }))).into_response()
        }
        ProbeStep::Artifact(content_type, bytes) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], bytes).into_response()
        }
        ProbeStep::Error(status, message) => (
            StatusCode::from_u16(status).unwrap(),
            Json(json!({ "error": message, "status": "failed" })),
        )
            .into_response(),
    }
}

async fn delete_image(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    state.delete_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_deleted.lock().unwrap() = Some(id);

    let status = *state.delete_status.lock().unwrap();
    if status.is_success() {
        (status, Json(json!({ "message": "Image deleted successfully" })))
    } else {
        (status, Json(json!({ "error": "image is not done" })))
    }
}
