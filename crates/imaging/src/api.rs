//! REST client for the image processing backend.

use reqwest::multipart::{Form, Part};
use serde::de::Error as _;
use serde::Deserialize;

use kiosk_http::{check_status, ensure_success, parse_json, ApiError};

use crate::job::{JobStatus, SubmitRequest};

/// What one status probe of a job yielded.
///
/// The backend answers the same `GET /image/{id}` with either a JSON
/// status envelope or, once the job is done, the processed bytes
/// themselves. That split is decided here, once, off the response
/// content type; callers never sniff bodies.
#[derive(Debug, Clone)]
pub enum Probe {
    /// The job has not produced its artifact yet.
    Status(JobStatus),
    /// The job finished and this is its output.
    Artifact(Artifact),
}

/// A processed image as downloaded from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    /// Content type the backend served the bytes with.
    pub content_type: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    image_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: Option<String>,
}

/// HTTP client for the image processing backend.
pub struct ImagingApi {
    client: reqwest::Client,
    base_url: String,
}

impl ImagingApi {
    /// Create a new API client.
    ///
    /// * `base_url` - service base, e.g. `http://host:8080/img_compressor/v1`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across clients).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Upload a file and its operation list; returns the assigned job id.
    ///
    /// Goes out as `POST /upload` with a `file` part (bytes plus file
    /// name) and an `operations` part carrying the steps as JSON text.
    pub async fn upload(&self, request: &SubmitRequest) -> Result<String, ApiError> {
        let operations = serde_json::to_string(&request.operations)?;
        let form = Form::new()
            .part(
                "file",
                Part::bytes(request.file.clone()).file_name(request.file_name.clone()),
            )
            .text("operations", operations);

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let upload: UploadResponse = parse_json(response).await?;
        tracing::debug!(image_id = %upload.image_id, "Upload accepted");
        Ok(upload.image_id)
    }

    /// Probe the job once.
    ///
    /// A JSON response is a status envelope (an absent `status` field
    /// parses as an unknown word); anything else is the artifact.
    pub async fn probe(&self, image_id: &str) -> Result<Probe, ApiError> {
        let response = self
            .client
            .get(format!("{}/image/{}", self.base_url, image_id))
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if content_type.contains("application/json") {
            let envelope: StatusEnvelope = response.json().await?;
            let status = envelope
                .status
                .as_deref()
                .map(JobStatus::parse)
                .unwrap_or_else(|| JobStatus::Other("unknown".to_string()));
            Ok(Probe::Status(status))
        } else {
            let bytes = response.bytes().await?.to_vec();
            Ok(Probe::Artifact(Artifact {
                bytes,
                content_type,
            }))
        }
    }

    /// Download the artifact for a job the backend has called done.
    ///
    /// A status envelope here means the backend contradicted itself;
    /// that reads as a failure to decode the expected payload.
    pub async fn fetch_artifact(&self, image_id: &str) -> Result<Artifact, ApiError> {
        match self.probe(image_id).await? {
            Probe::Artifact(artifact) => Ok(artifact),
            Probe::Status(status) => Err(ApiError::Decode(serde_json::Error::custom(format!(
                "expected artifact bytes for job {image_id}, got status '{status}'"
            )))),
        }
    }

    /// Delete a job's stored artifact.
    ///
    /// The backend refuses while the job is still processing.
    pub async fn delete(&self, image_id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(format!("{}/image/{}", self.base_url, image_id))
            .send()
            .await?;

        check_status(response).await
    }
}
