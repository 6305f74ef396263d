//! Fixed-interval polling of one job until it ends.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::{Artifact, ImagingApi, Probe};
use crate::events::JobEvent;
use crate::job::JobStatus;

/// Polling cadence.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Gap between status probes. The first probe fires one interval
    /// after polling starts, not immediately.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
        }
    }
}

/// How a polling run ended.
#[derive(Debug)]
pub enum PollOutcome {
    /// The artifact arrived.
    Resolved(Artifact),
    /// The job failed, or a probe errored out.
    Failed { reason: String },
    /// Cancellation won; nothing about the job may be concluded.
    Cancelled,
}

/// Poll `image_id` until the job resolves, fails, or `cancel` fires.
///
/// One probe per tick, awaited to completion before the next tick is
/// armed, so probes never overlap even when a response outlives the
/// interval. The token is re-checked after each probe returns: a
/// response that raced a cancellation is discarded, not applied.
///
/// The artifact bytes are the usual completion signal; a `done` status
/// envelope triggers one immediate artifact fetch instead of waiting
/// out another tick.
pub async fn poll_job(
    api: &ImagingApi,
    image_id: &str,
    config: PollConfig,
    cancel: &CancellationToken,
    events: &broadcast::Sender<JobEvent>,
) -> PollOutcome {
    let first_tick = tokio::time::Instant::now() + config.interval;
    let mut ticker = tokio::time::interval_at(first_tick, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(image_id, "Polling cancelled");
                return PollOutcome::Cancelled;
            }
            _ = ticker.tick() => {}
        }

        let probe = api.probe(image_id).await;
        if cancel.is_cancelled() {
            tracing::debug!(image_id, "Discarding probe answer after cancellation");
            return PollOutcome::Cancelled;
        }

        match probe {
            Ok(Probe::Artifact(artifact)) => {
                return PollOutcome::Resolved(artifact);
            }
            Ok(Probe::Status(JobStatus::Done)) => {
                let fetched = api.fetch_artifact(image_id).await;
                if cancel.is_cancelled() {
                    return PollOutcome::Cancelled;
                }
                return match fetched {
                    Ok(artifact) => PollOutcome::Resolved(artifact),
                    Err(e) => PollOutcome::Failed {
                        reason: e.to_string(),
                    },
                };
            }
            Ok(Probe::Status(JobStatus::Failed)) => {
                return PollOutcome::Failed {
                    reason: "image processing failed".to_string(),
                };
            }
            Ok(Probe::Status(status)) => {
                tracing::debug!(image_id, status = %status, "Job still in flight");
                let _ = events.send(JobEvent::StatusObserved {
                    image_id: image_id.to_string(),
                    status,
                });
            }
            Err(e) => {
                return PollOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        }
    }
}
