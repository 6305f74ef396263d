//! `kiosk-retouch` -- interactive image processing console.
//!
//! Uploads an image with resize/watermark operations, follows the job
//! through the session's event stream, and writes the processed bytes
//! to disk on request. The job keeps polling in the background while
//! the console waits for input.
//!
//! # Environment variables
//!
//! | Variable            | Required | Default | Description                    |
//! |---------------------|----------|---------|--------------------------------|
//! | `KIOSK_IMAGING_URL` | no       | `http://localhost:8080/img_compressor/v1` | Image backend base URL |
//! | `KIOSK_POLL_MS`     | no       | `1500`  | Milliseconds between status probes |

use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiosk_console::{parse_retouch_command, RetouchCommand, RETOUCH_HELP};
use kiosk_imaging::api::ImagingApi;
use kiosk_imaging::events::JobEvent;
use kiosk_imaging::job::{Operations, Resize, SubmitRequest, Watermark};
use kiosk_imaging::poller::PollConfig;
use kiosk_imaging::session::JobSession;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/img_compressor/v1";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiosk_retouch=info,kiosk_imaging=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("KIOSK_IMAGING_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let config = std::env::var("KIOSK_POLL_MS")
        .ok()
        .and_then(|value| value.parse().ok())
        .map(|millis| PollConfig {
            interval: Duration::from_millis(millis),
        })
        .unwrap_or_default();
    tracing::info!(base_url = %base_url, interval = ?config.interval, "Retouch console starting");

    let session = JobSession::with_config(ImagingApi::new(base_url), config);
    let mut events = session.subscribe();

    println!("{RETOUCH_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let line = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => line,
                _ => break,
            },
            event = events.recv() => {
                if let Ok(event) = event {
                    report(&event);
                }
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_retouch_command(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match command {
            RetouchCommand::Help => println!("{RETOUCH_HELP}"),
            RetouchCommand::Quit => break,
            RetouchCommand::Send {
                path,
                resize,
                watermark,
            } => send(&session, &path, resize, watermark).await,
            RetouchCommand::Status => status(&session).await,
            RetouchCommand::Save(path) => save(&session, path).await,
            RetouchCommand::Remove => {
                if let Err(e) = session.delete().await {
                    eprintln!("error: {e}");
                }
            }
        }
    }

    session.shutdown().await;
    tracing::info!("Retouch console exiting");
}

/// Read the file and hand it to the session; progress comes back over
/// the event stream.
async fn send(
    session: &JobSession,
    path: &str,
    resize: Option<Resize>,
    watermark: Option<String>,
) {
    let file = match tokio::fs::read(path).await {
        Ok(file) => file,
        Err(e) => {
            eprintln!("error: cannot read {path}: {e}");
            return;
        }
    };
    let file_name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let request = SubmitRequest {
        file_name,
        file,
        operations: Operations {
            resize,
            watermark: watermark.map(|text| Watermark { text }),
        },
    };

    if let Err(e) = session.submit(request).await {
        eprintln!("error: {e}");
    }
}

async fn status(session: &JobSession) {
    let phase = session.phase().await;
    match session.current_image_id().await {
        Some(image_id) => match session.failure().await {
            Some(reason) => println!("Job {image_id}: {phase} ({reason})"),
            None => println!("Job {image_id}: {phase}"),
        },
        None => println!("No job."),
    }
}

async fn save(session: &JobSession, path: Option<String>) {
    let Some(artifact) = session.artifact().await else {
        eprintln!("error: no processed image to save yet");
        return;
    };

    let image_id = session.current_image_id().await;
    let path = path.unwrap_or_else(|| {
        let extension = image::guess_format(&artifact.bytes)
            .ok()
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("bin");
        format!("{}.{extension}", image_id.as_deref().unwrap_or("retouched"))
    });

    match tokio::fs::write(&path, &artifact.bytes).await {
        Ok(()) => println!("Saved {} bytes to {path}.", artifact.bytes.len()),
        Err(e) => eprintln!("error: cannot write {path}: {e}"),
    }
}

fn report(event: &JobEvent) {
    match event {
        JobEvent::Submitted { image_id } => println!("[job {image_id}] submitted"),
        JobEvent::StatusObserved { image_id, status } => println!("[job {image_id}] {status}"),
        JobEvent::Resolved {
            image_id,
            content_type,
            size,
        } => println!("[job {image_id}] done: {size} bytes ({content_type}); 'save' writes it out"),
        JobEvent::Failed { image_id, reason } => println!("[job {image_id}] failed: {reason}"),
        JobEvent::Deleted { image_id } => println!("[job {image_id}] deleted"),
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
