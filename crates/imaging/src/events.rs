//! Progress events broadcast by a job session.

use crate::job::JobStatus;

/// What a running job session announces to its subscribers.
///
/// Broadcast semantics: a lagging subscriber misses events instead of
/// slowing the session down.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// Upload accepted; polling starts.
    Submitted { image_id: String },
    /// A probe saw the job still in flight.
    StatusObserved { image_id: String, status: JobStatus },
    /// The processed artifact arrived and is cached on the session.
    Resolved {
        image_id: String,
        content_type: String,
        size: usize,
    },
    /// The job failed, or a probe broke down.
    Failed { image_id: String, reason: String },
    /// The stored artifact was deleted.
    Deleted { image_id: String },
}
