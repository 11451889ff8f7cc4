//! Concurrent load probe.
//!
//! Fires `request_count` independent streaming requests, bounded by a
//! semaphore of `workers()` permits, and reports time-to-first-byte
//! statistics once every request has finished.

use std::sync::Arc;
use std::time::{Duration, Instant};

use speech_core::{
    render_summary, render_table, ChunkTracker, LatencySummary, ProbeResult, RequestOutcome,
    SpeechPayload,
};
use stream_client::{ClientOptions, StreamClient};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::ProbeConfig;
use crate::console::Console;
use crate::error::{client_error_result, ProbeError};
use crate::validation::validate_config;

/// Run the concurrent probe and return the outcomes sorted by request id.
///
/// `Err` only for an invalid configuration. Every request ends up as exactly
/// one outcome, whether it succeeded, failed or its worker died.
pub async fn run_concurrent(
    config: &ProbeConfig,
    console: &Console,
) -> Result<Vec<RequestOutcome>, ProbeError> {
    validate_config(config)?;

    let count = config.request_count;
    let workers = config.workers();
    console.line(format!(
        "🔥 Starting load test with {} concurrent requests to {} ({} workers, {})...",
        count,
        config.url(),
        workers,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let semaphore = Arc::new(Semaphore::new(workers));
    let payload = Arc::new(config.payload.clone());
    let base_url = config.base_url();
    let timeout = config.concurrent_timeout();

    let mut tasks = JoinSet::new();
    for id in 1..=count {
        let semaphore = semaphore.clone();
        let payload = payload.clone();
        let base_url = base_url.clone();
        let console = console.clone();
        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    return RequestOutcome::new(
                        id,
                        ProbeResult::OtherError {
                            message: format!("Worker pool closed: {e}"),
                        },
                    )
                }
            };
            send_request(id, &base_url, timeout, &payload, &console).await
        });
    }

    // completion order; re-sorted by id when rendered
    let mut outcomes = Vec::with_capacity(count);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => warn!(error = %e, "load probe worker failed"),
        }
    }
    for id in 1..=count {
        if !outcomes.iter().any(|o: &RequestOutcome| o.id == id) {
            outcomes.push(RequestOutcome::new(
                id,
                ProbeResult::OtherError {
                    message: "Worker task failed".to_string(),
                },
            ));
        }
    }

    console.line("");
    console.block(render_table(&mut outcomes));
    let summary = LatencySummary::from_outcomes(&outcomes);
    console.block(render_summary(summary.as_ref()));

    info!(
        requests = count,
        succeeded = summary.as_ref().map(|s| s.succeeded).unwrap_or(0),
        "load test finished"
    );

    Ok(outcomes)
}

/// One request's full lifecycle, silent per chunk
async fn send_request(
    id: usize,
    base_url: &str,
    timeout: Duration,
    payload: &SpeechPayload,
    console: &Console,
) -> RequestOutcome {
    console.line(format!("🚀 [Req {id}] STARTING..."));

    // own client per request: no connection reuse between requests
    let client = match StreamClient::new(base_url, ClientOptions { timeout }) {
        Ok(client) => client,
        Err(e) => return failed(id, console, client_error_result(e)),
    };

    let started = Instant::now();
    let mut stream = match client.open(payload).await {
        Ok(stream) => stream,
        Err(e) => return failed(id, console, client_error_result(e)),
    };
    debug!(id, request_id = stream.request_id(), "stream opened");

    let mut tracker = ChunkTracker::new(started);
    loop {
        match stream.next_chunk().await {
            Ok(Some(chunk)) => {
                if let Some(event) = tracker.record(chunk.len(), Instant::now()) {
                    if event.first {
                        console.line(format!(
                            "⚡️ [Req {id}] TTFB: {:.1}ms",
                            event.elapsed.as_secs_f64() * 1000.0
                        ));
                    }
                }
            }
            Ok(None) => break,
            Err(e) => return failed(id, console, client_error_result(e)),
        }
    }

    let summary = tracker.finish(Instant::now());
    console.line(format!(
        "✅ [Req {id}] DONE in {:.2}s ({} bytes)",
        summary.total.as_secs_f64(),
        summary.bytes
    ));
    RequestOutcome::new(id, ProbeResult::Success { summary })
}

fn failed(id: usize, console: &Console, result: ProbeResult) -> RequestOutcome {
    match &result {
        ProbeResult::HttpError { status } => {
            console.line(format!("❌ [Req {id}] FAILED: {status}"))
        }
        other => console.line(format!(
            "❌ [Req {id}] ERROR: {}",
            other.error_text().unwrap_or_default()
        )),
    }
    warn!(id, error = ?result.error_text(), "load probe request failed");
    RequestOutcome::new(id, result)
}
