//! Image job wire types: statuses, operations, and the upload request.

use std::fmt;

use serde::Serialize;

use kiosk_core::error::CoreError;
use kiosk_core::text::require_text;

/// Lifecycle status reported by the image backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Done,
    Failed,
    /// A status word this client does not know. Kept verbatim so logs
    /// and events show what the backend actually said.
    Other(String),
}

impl JobStatus {
    /// Parse the wire word; unknown words land in [`JobStatus::Other`].
    pub fn parse(word: &str) -> Self {
        match word {
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "done" => JobStatus::Done,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    /// Whether the job has finished, one way or the other.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
            JobStatus::Other(word) => word,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resize to the given bounds. A zero side is unconstrained; the backend
/// keeps the aspect ratio for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
}

/// Stamp a text watermark onto the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Watermark {
    pub text: String,
}

/// The processing steps requested for an upload. Serialized as the
/// `operations` multipart field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Operations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize: Option<Resize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<Watermark>,
}

impl Operations {
    pub fn is_empty(&self) -> bool {
        self.resize.is_none() && self.watermark.is_none()
    }
}

/// One upload: the file plus the operations to run on it.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// File name sent with the multipart part; the backend keys storage
    /// off its extension.
    pub file_name: String,
    /// Raw file bytes.
    pub file: Vec<u8>,
    /// Requested processing steps.
    pub operations: Operations,
}

impl SubmitRequest {
    /// Check the request locally. An empty file, an empty operation
    /// list, a fully unbounded resize, or a blank watermark is refused
    /// before any bytes go out.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.file.is_empty() {
            return Err(CoreError::Validation(
                "image file must not be empty".to_string(),
            ));
        }
        if self.operations.is_empty() {
            return Err(CoreError::Validation(
                "at least one operation (resize or watermark) is required".to_string(),
            ));
        }
        if let Some(resize) = self.operations.resize {
            if resize.width == 0 && resize.height == 0 {
                return Err(CoreError::Validation(
                    "resize needs at least one bounded side".to_string(),
                ));
            }
        }
        if let Some(watermark) = &self.operations.watermark {
            require_text("watermark text", &watermark.text)?;
        }
        Ok(())
    }
}

// ---------- Tests ----------

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_status_words_round_trip() {
        assert_eq!(JobStatus::parse("pending"), JobStatus::Pending);
        assert_eq!(JobStatus::parse("processing"), JobStatus::Processing);
        assert_eq!(JobStatus::parse("done"), JobStatus::Done);
        assert_eq!(JobStatus::parse("failed"), JobStatus::Failed);
        assert_eq!(JobStatus::Processing.to_string(), "processing");
    }

    #[test]
    fn test_unknown_status_is_kept_verbatim() {
        let status = JobStatus::parse("queued");
        assert_eq!(status, JobStatus::Other("queued".to_string()));
        assert_eq!(status.to_string(), "queued");
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }

    #[test]
    fn test_operations_serialize_only_requested_steps() {
        let ops = Operations {
            resize: Some(Resize {
                width: 800,
                height: 0,
            }),
            watermark: None,
        };
        assert_eq!(
            serde_json::to_value(&ops).unwrap(),
            json!({ "resize": { "width": 800, "height": 0 } })
        );

        let ops = Operations {
            resize: None,
            watermark: Some(Watermark {
                text: "kiosk".to_string(),
            }),
        };
        assert_eq!(
            serde_json::to_value(&ops).unwrap(),
            json!({ "watermark": { "text": "kiosk" } })
        );
    }

    #[test]
    fn test_validate_rejects_empty_file() {
        let request = SubmitRequest {
            file_name: "photo.png".to_string(),
            file: Vec::new(),
            operations: Operations {
                resize: Some(Resize {
                    width: 100,
                    height: 100,
                }),
                watermark: None,
            },
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_operations() {
        let request = SubmitRequest {
            file_name: "photo.png".to_string(),
            file: vec![1, 2, 3],
            operations: Operations::default(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_fully_unbounded_resize() {
        let request = SubmitRequest {
            file_name: "photo.png".to_string(),
            file: vec![1, 2, 3],
            operations: Operations {
                resize: Some(Resize {
                    width: 0,
                    height: 0,
                }),
                watermark: None,
            },
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_watermark() {
        let request = SubmitRequest {
            file_name: "photo.png".to_string(),
            file: vec![1, 2, 3],
            operations: Operations {
                resize: None,
                watermark: Some(Watermark {
                    text: "   ".to_string(),
                }),
            },
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_a_real_request() {
        let request = SubmitRequest {
            file_name: "photo.png".to_string(),
            file: vec![1, 2, 3],
            operations: Operations {
                resize: None,
                watermark: Some(Watermark {
                    text: "hello".to_string(),
                }),
            },
        };
        assert!(request.validate().is_ok());
    }
}
