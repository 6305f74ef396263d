//! Shared HTTP plumbing for the kiosk backend clients.
//!
//! Both backends report failures as a JSON `{"error": "..."}` envelope
//! with a non-2xx status. This crate centralizes decoding that envelope
//! and the success/parse helpers the API wrappers share.

use serde::Deserialize;

/// Errors from the HTTP boundary, shared by all API wrappers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error envelope, or the status reason.
        message: String,
    },

    /// A 2xx response carried a payload the client could not decode.
    #[error("Unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// JSON failure envelope used by both backends.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

/// Extract a user-facing message from a failure response body.
///
/// Best-effort: prefers the envelope's `error` field, falls back to the
/// HTTP canonical reason, then to the bare status code.
pub fn error_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        if let Some(message) = envelope.error {
            if !message.is_empty() {
                return message;
            }
        }
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Ensure the response has a success status code.
///
/// Returns the response unchanged on success, or an [`ApiError::Api`]
/// carrying the status and the extracted message on failure.
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.bytes().await.unwrap_or_default();
        return Err(ApiError::Api {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

/// Assert the response has a success status code, discarding the body.
pub async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
    ensure_success(response).await?;
    Ok(())
}
