//! Image processing job client.
//!
//! Uploads an image with its operation list, polls the job on a fixed
//! interval until it resolves or fails, and downloads the processed
//! artifact. The session layer runs one job at a time and broadcasts
//! progress events; polling is cancellable at every step.

pub mod api;
pub mod events;
pub mod job;
pub mod poller;
pub mod session;
