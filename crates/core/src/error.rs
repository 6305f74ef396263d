/// Domain-level errors shared by the kiosk clients.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Local input validation failed; nothing was sent to a backend.
    #[error("Validation failed: {0}")]
    Validation(String),
}
