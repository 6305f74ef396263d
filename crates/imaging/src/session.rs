//! The job session: one image job at a time, from upload to artifact.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use kiosk_core::error::CoreError;
use kiosk_http::ApiError;

use crate::api::{Artifact, ImagingApi};
use crate::events::JobEvent;
use crate::job::SubmitRequest;
use crate::poller::{poll_job, PollConfig, PollOutcome};

/// Capacity of the event channel. Slow subscribers drop old events.
const EVENT_CAPACITY: usize = 64;

/// How long winding down waits for a cancelled poller to acknowledge.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle phase of the session's current job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobPhase {
    /// No job in flight and nothing resolved.
    #[default]
    Idle,
    /// Upload sent, id not yet assigned.
    Submitting,
    /// Job accepted; status probes are running.
    Polling,
    /// Artifact downloaded and cached.
    Resolved,
    /// The job failed, or a probe broke down.
    Failed,
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobPhase::Idle => "idle",
            JobPhase::Submitting => "submitting",
            JobPhase::Polling => "polling",
            JobPhase::Resolved => "resolved",
            JobPhase::Failed => "failed",
        })
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Local input validation failed; no request was sent.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The backend or the transport rejected a request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An operation that needs a current job found none.
    #[error("No active job")]
    NoActiveJob,
}

struct ActiveJob {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct SessionState {
    phase: JobPhase,
    current_id: Option<String>,
    artifact: Option<Artifact>,
    failure: Option<String>,
    active: Option<ActiveJob>,
}

/// Drives one image job at a time against the processing backend.
///
/// Submitting a new job cancels the previous poller before anything
/// else happens, so at most one poll loop exists per session. State
/// lives behind one lock; subscribers follow along via the broadcast
/// channel instead of polling the session.
pub struct JobSession {
    api: Arc<ImagingApi>,
    config: PollConfig,
    state: Arc<RwLock<SessionState>>,
    events: broadcast::Sender<JobEvent>,
    cancel_token: CancellationToken,
}

impl JobSession {
    pub fn new(api: ImagingApi) -> Self {
        Self::with_config(api, PollConfig::default())
    }

    pub fn with_config(api: ImagingApi, config: PollConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api: Arc::new(api),
            config,
            state: Arc::new(RwLock::new(SessionState::default())),
            events,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Subscribe to progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> JobPhase {
        self.state.read().await.phase
    }

    /// Id of the current job, if one is in flight or resolved.
    pub async fn current_image_id(&self) -> Option<String> {
        self.state.read().await.current_id.clone()
    }

    /// The downloaded artifact, once the job has resolved.
    pub async fn artifact(&self) -> Option<Artifact> {
        self.state.read().await.artifact.clone()
    }

    /// Why the current job failed, once it has.
    pub async fn failure(&self) -> Option<String> {
        self.state.read().await.failure.clone()
    }

    /// Upload a new job and start polling it.
    ///
    /// The previous job, in whatever state, is cancelled and forgotten
    /// first. Returns the new job id once the backend accepts the
    /// upload; a rejected upload puts the session back to idle.
    pub async fn submit(&self, request: SubmitRequest) -> Result<String, SessionError> {
        request.validate()?;

        let active = {
            let mut state = self.state.write().await;
            state.phase = JobPhase::Submitting;
            state.current_id = None;
            state.artifact = None;
            state.failure = None;
            state.active.take()
        };
        drain(active).await;

        let image_id = match self.api.upload(&request).await {
            Ok(id) => id,
            Err(e) => {
                self.state.write().await.phase = JobPhase::Idle;
                return Err(e.into());
            }
        };

        let cancel = self.cancel_token.child_token();
        let task = tokio::spawn(run_poller(
            self.api.clone(),
            image_id.clone(),
            self.config,
            cancel.clone(),
            self.state.clone(),
            self.events.clone(),
        ));

        {
            let mut state = self.state.write().await;
            state.phase = JobPhase::Polling;
            state.current_id = Some(image_id.clone());
            state.active = Some(ActiveJob { cancel, task });
        }

        tracing::info!(image_id = %image_id, "Job submitted");
        let _ = self.events.send(JobEvent::Submitted {
            image_id: image_id.clone(),
        });

        Ok(image_id)
    }

    /// Delete the current job's stored artifact.
    ///
    /// The poller is cancelled first so no probe can race the delete.
    /// Local state is cleared whether or not the backend accepts; the
    /// session is done with this job either way, and a refusal still
    /// reaches the caller as an error.
    pub async fn delete(&self) -> Result<(), SessionError> {
        let (image_id, active) = {
            let mut state = self.state.write().await;
            let Some(image_id) = state.current_id.clone() else {
                return Err(SessionError::NoActiveJob);
            };
            (image_id, state.active.take())
        };
        drain(active).await;

        let result = self.api.delete(&image_id).await;

        {
            let mut state = self.state.write().await;
            if state.current_id.as_deref() == Some(image_id.as_str()) {
                state.phase = JobPhase::Idle;
                state.current_id = None;
                state.artifact = None;
                state.failure = None;
            }
        }

        match result {
            Ok(()) => {
                tracing::info!(image_id = %image_id, "Artifact deleted");
                let _ = self.events.send(JobEvent::Deleted { image_id });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(image_id = %image_id, error = %e, "Delete refused; local job state cleared");
                Err(e.into())
            }
        }
    }

    /// Cancel everything and wait briefly for the poller to stop.
    pub async fn shutdown(&self) {
        self.cancel_token.cancel();
        let active = self.state.write().await.active.take();
        drain(active).await;
    }
}

/// Cancel an active poller and wait for it to wind down, so a stale
/// probe cannot land after the session state moves on.
async fn drain(active: Option<ActiveJob>) {
    let Some(active) = active else { return };

    active.cancel.cancel();
    if tokio::time::timeout(DRAIN_TIMEOUT, active.task).await.is_err() {
        tracing::warn!("Poller did not stop in time; detaching it");
    }
}

/// Body of the spawned polling task: runs the poll loop, then applies
/// the outcome to the session state it belongs to.
async fn run_poller(
    api: Arc<ImagingApi>,
    image_id: String,
    config: PollConfig,
    cancel: CancellationToken,
    state: Arc<RwLock<SessionState>>,
    events: broadcast::Sender<JobEvent>,
) {
    let outcome = poll_job(&api, &image_id, config, &cancel, &events).await;

    match outcome {
        PollOutcome::Resolved(artifact) => {
            let content_type = artifact.content_type.clone();
            let size = artifact.bytes.len();
            {
                let mut state = state.write().await;
                // The session may have moved on to another job while
                // this one was finishing.
                if state.current_id.as_deref() != Some(image_id.as_str()) {
                    return;
                }
                state.phase = JobPhase::Resolved;
                state.artifact = Some(artifact);
                state.active = None;
            }
            tracing::info!(image_id = %image_id, content_type = %content_type, size, "Job resolved");
            let _ = events.send(JobEvent::Resolved {
                image_id,
                content_type,
                size,
            });
        }
        PollOutcome::Failed { reason } => {
            {
                let mut state = state.write().await;
                if state.current_id.as_deref() != Some(image_id.as_str()) {
                    return;
                }
                state.phase = JobPhase::Failed;
                state.failure = Some(reason.clone());
                state.active = None;
            }
            tracing::warn!(image_id = %image_id, reason = %reason, "Job failed");
            let _ = events.send(JobEvent::Failed { image_id, reason });
        }
        PollOutcome::Cancelled => {}
    }
}
